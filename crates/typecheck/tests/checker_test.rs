//! End-to-end checks over complete programs.

use agency_parser::{parse, serialize, VariableType};
use agency_typecheck::{check, is_assignable, TypeAliases, TypeCheckOptions, TypeChecker};
use pretty_assertions::assert_eq;

#[test]
fn test_untyped_parameter_is_any() {
    let source = "def add(x: number, y) { x }";
    let program = parse(source).unwrap();

    let checker = TypeChecker::new(&program, &TypeCheckOptions::default());
    let scope = checker.scope(Some("add")).unwrap();
    assert_eq!(scope.get("x"), Some(&VariableType::primitive("number")));
    assert_eq!(scope.get("y"), Some(&VariableType::any()));
    assert!(checker.check().is_ok());

    assert_eq!(serialize(&program), "def add(x: number, y) {\nx\n}");
}

#[test]
fn test_alias_object_width_subtyping() {
    let program = parse("type Coords = {x: number, y: number}\n").unwrap();
    let aliases = TypeAliases::collect(&program.nodes);
    let coords = VariableType::alias("Coords");

    let wide = VariableType::object([
        ("x", VariableType::primitive("number")),
        ("y", VariableType::primitive("number")),
        ("z", VariableType::primitive("number")),
    ]);
    let narrow = VariableType::object([("x", VariableType::primitive("number"))]);

    assert!(is_assignable(&wide, &coords, &aliases));
    assert!(!is_assignable(&narrow, &coords, &aliases));
}

#[test]
fn test_alias_object_literals_in_program() {
    let source = r#"type Coords = {x: number, y: number}

a: Coords = {x: 1, y: 2, z: 3}
b: Coords = {x: 1}
"#;
    let program = parse(source).unwrap();
    let result = check(&program, &TypeCheckOptions::default());
    assert_eq!(result.errors.len(), 1);
    let err = &result.errors[0];
    assert_eq!(err.variable_name.as_deref(), Some("b"));
    assert_eq!(err.expected_type.as_deref(), Some("Coords"));
    assert_eq!(err.actual_type.as_deref(), Some("{ x: number }"));
}

#[test]
fn test_union_properties() {
    let aliases = TypeAliases::default();
    let a = VariableType::primitive("string");
    let b = VariableType::primitive("number");
    let union = VariableType::union(vec![a.clone(), b.clone()]);

    assert!(is_assignable(&a, &union, &aliases));
    assert!(is_assignable(&b, &union, &aliases));
    assert!(!is_assignable(&union, &a, &aliases));

    let literal_union = VariableType::union(vec![
        VariableType::StringLiteral {
            value: "a".to_string(),
        },
        VariableType::StringLiteral {
            value: "b".to_string(),
        },
    ]);
    assert!(is_assignable(&literal_union, &a, &aliases));
}

#[test]
fn test_graph_program() {
    let source = r#"type Ticket = { id: number; subject: string }

def classify(ticket: Ticket): "refund" | "question" {
  return "question"
}

node triage(ticket: Ticket) {
  kind: "refund" | "question" = classify(ticket)
  if (kind == "refund") {
    return refund(ticket, kind)
  }
  return answer(ticket)
}

node refund(ticket: Ticket, reason: string) {
  print(ticket.id)
}

node answer(ticket: Ticket) {
  reply: string = `Answer ${ticket}`
  print(reply)
}
"#;
    let program = parse(source).unwrap();
    let result = check(&program, &TypeCheckOptions::default());
    assert_eq!(result.errors, vec![]);
}

#[test]
fn test_errors_serialize_for_tooling() {
    let program = parse("def f(a: string[]) {\n  return a\n}\nf([1, 2])\n").unwrap();
    let result = check(&program, &TypeCheckOptions::default());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "errors": [{
                "message": "Argument 'a' of 'f': expected string[], got number[]",
                "variableName": "a",
                "expectedType": "string[]",
                "actualType": "number[]"
            }]
        })
    );
}

#[test]
fn test_distinct_recursive_aliases_check_without_looping() {
    let source = r#"type A = { value: number; next: A[] }
type B = { value: number; next: B[] }
type C = { value: string; next: C[] }

a :: A
b :: B
c :: C
b = a
c = a
"#;
    let program = parse(source).unwrap();
    let result = check(&program, &TypeCheckOptions::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].variable_name.as_deref(), Some("c"));
}

//! Variable-type scopes and definition signatures.
//!
//! There is one scope for the top level and one per function or graph node.
//! Nested blocks (`if`, `while`, `match`, `time`) share the scope of the
//! definition that contains them.

use crate::error::TypeCheckError;
use agency_parser::walk::walk_nodes;
use agency_parser::{FunctionParameter, Node, VariableType};
use indexmap::IndexMap;

/// Variable name to type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Enclosing definition name, `None` for the top level.
    pub name: Option<String>,
    variables: IndexMap<String, VariableType>,
    return_type: Option<VariableType>,
}

impl Scope {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Record `name` unless it already has a type. Returns whether it was added.
    pub fn declare(&mut self, name: &str, ty: VariableType) -> bool {
        if self.variables.contains_key(name) {
            return false;
        }
        self.variables.insert(name.to_string(), ty);
        true
    }

    pub fn get(&self, name: &str) -> Option<&VariableType> {
        self.variables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableType)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Declared return type, when it expects a value.
    pub fn return_type(&self) -> Option<&VariableType> {
        self.return_type.as_ref().filter(|ty| !ty.is_empty_type())
    }

    /// Build the scope of one body.
    ///
    /// Parameters come first (untyped ones as `any`). Then the body is
    /// scanned in order and each variable is pinned to its first annotation,
    /// from `name :: T` or `name: T = ...`. Variables never annotated are
    /// `any`; under `strict` each also yields one error.
    pub fn build(
        name: Option<String>,
        parameters: &[FunctionParameter],
        return_type: Option<&VariableType>,
        body: &[Node],
        strict: bool,
        errors: &mut Vec<TypeCheckError>,
    ) -> Self {
        let mut scope = Scope::new(name);
        scope.return_type = return_type.cloned();

        for param in parameters {
            let ty = param.type_hint.clone().unwrap_or_else(VariableType::any);
            scope.declare(&param.name, ty);
        }

        let mut unannotated: Vec<&str> = Vec::new();
        for_each_statement(body, &mut |statement| match statement {
            Node::TypeHint {
                variable_name,
                variable_type,
            } => {
                scope.declare(variable_name, variable_type.clone());
            }
            Node::Assignment {
                variable_name,
                type_hint: Some(ty),
                ..
            } => {
                scope.declare(variable_name, ty.clone());
            }
            Node::Assignment {
                variable_name,
                type_hint: None,
                ..
            } => {
                if !unannotated.contains(&variable_name.as_str()) {
                    unannotated.push(variable_name);
                }
            }
            _ => {}
        });

        for variable in unannotated {
            if scope.declare(variable, VariableType::any()) && strict {
                let mut err = TypeCheckError::new(format!(
                    "Variable '{}' has no type annotation",
                    variable
                ))
                .with_variable(variable);
                if let Some(scope_name) = &scope.name {
                    err.message.push_str(&format!(" in '{}'", scope_name));
                }
                errors.push(err);
            }
        }

        tracing::trace!(scope = ?scope.name, variables = scope.len(), "built scope");
        scope
    }
}

/// Visit the statements of a body and of its nested blocks, in source
/// order. Nested function and graph-node definitions are not entered.
pub fn for_each_statement<'a, F>(body: &'a [Node], f: &mut F)
where
    F: FnMut(&'a Node),
{
    for statement in body {
        f(statement);
        match statement {
            Node::IfElse {
                then_body,
                else_body,
                ..
            } => {
                for_each_statement(then_body, f);
                if let Some(else_body) = else_body {
                    for_each_statement(else_body, f);
                }
            }
            Node::WhileLoop { body, .. } | Node::TimeBlock { body } => {
                for_each_statement(body, f);
            }
            Node::MatchBlock { cases, .. } => {
                for case in cases {
                    for_each_statement(std::slice::from_ref(case.body.as_ref()), f);
                }
            }
            _ => {}
        }
    }
}

/// What a call site needs to know about a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Option<VariableType>,
    pub is_graph_node: bool,
}

/// Definitions by name, in source order. The first definition of a name wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signatures {
    by_name: IndexMap<String, Signature>,
}

impl Signatures {
    pub fn collect(nodes: &[Node]) -> Self {
        let mut by_name = IndexMap::new();
        walk_nodes(nodes, &mut |node, _| {
            let signature = match node {
                Node::Function(def) => Signature {
                    name: def.function_name.clone(),
                    parameters: def.parameters.clone(),
                    return_type: def.return_type.clone(),
                    is_graph_node: false,
                },
                Node::GraphNode(def) => Signature {
                    name: def.node_name.clone(),
                    parameters: def.parameters.clone(),
                    return_type: def.return_type.clone(),
                    is_graph_node: true,
                },
                _ => return,
            };
            by_name.entry(signature.name.clone()).or_insert(signature);
        });
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.by_name.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.by_name.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope_of(source: &str, strict: bool) -> (Scope, Vec<TypeCheckError>) {
        let program = agency_parser::parse(source).unwrap();
        let mut errors = Vec::new();
        let scope = Scope::build(None, &[], None, &program.nodes, strict, &mut errors);
        (scope, errors)
    }

    #[test]
    fn test_nested_blocks_share_scope() {
        let (scope, _) = scope_of(
            "if (ok) {\n  a: number = 1\n} else {\n  b :: string\n}\nwhile (x) {\n  c: boolean = true\n}\nmatch(v) {\n  1 => d: number = 2\n  _ => e = 3\n}\n",
            false,
        );
        let names: Vec<&str> = scope.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(scope.get("e"), Some(&VariableType::any()));
    }

    #[test]
    fn test_first_annotation_pins() {
        let (scope, _) = scope_of("x = 1\nx :: number\nx: string = \"a\"\n", false);
        assert_eq!(scope.get("x"), Some(&VariableType::primitive("number")));
    }

    #[test]
    fn test_strict_reports_each_unannotated_variable_once() {
        let (_, errors) = scope_of("x = 1\nx = 2\ny: number = 3\n", true);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].variable_name.as_deref(), Some("x"));
    }

    #[test]
    fn test_nested_definitions_are_not_entered() {
        let (scope, _) = scope_of("def f() {\n  inner: number = 1\n}\nouter: number = 2\n", false);
        assert!(scope.get("inner").is_none());
        assert!(scope.get("outer").is_some());
    }

    #[test]
    fn test_signatures_collect_both_kinds() {
        let program =
            agency_parser::parse("def f(a: number): string {\n  return \"x\"\n}\nnode main() {\n  f(1)\n}\n")
                .unwrap();
        let signatures = Signatures::collect(&program.nodes);
        assert!(!signatures.get("f").unwrap().is_graph_node);
        assert!(signatures.get("main").unwrap().is_graph_node);
        assert_eq!(
            signatures.get("f").unwrap().return_type,
            Some(VariableType::primitive("string"))
        );
    }
}

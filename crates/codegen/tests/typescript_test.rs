//! End-to-end tests: Agency source in, TypeScript out.

use agency_codegen::{generate_typescript, CodegenError, CodegenOptions};
use agency_graph::{preprocess, PreprocessOptions};
use pretty_assertions::assert_eq;

fn compile_with(source: &str, options: &CodegenOptions) -> Result<String, CodegenError> {
    let program = agency_parser::parse(source).unwrap_or_else(|err| panic!("{}", err.message));
    let preprocessed = preprocess(&program, &PreprocessOptions::default()).unwrap();
    generate_typescript(&preprocessed, options)
}

fn compile(source: &str) -> String {
    compile_with(source, &CodegenOptions::default()).unwrap()
}

/// The lines of the block that starts with `header`, up to its closing brace.
fn block<'a>(output: &'a str, header: &str) -> Vec<&'a str> {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines
        .iter()
        .position(|line| line.starts_with(header))
        .unwrap_or_else(|| panic!("no line starting with {header:?} in:\n{output}"));
    let end = lines[start..]
        .iter()
        .position(|line| *line == "}")
        .map(|offset| start + offset)
        .unwrap();
    lines[start..=end].to_vec()
}

#[test]
fn test_function_becomes_step_machine() {
    let output = compile("def double(x: number) {\n  y = x + x\n  return y\n}\n");
    assert_eq!(
        block(&output, "export async function double"),
        vec![
            "export async function double(x: number, __state: RunState = __newRunState()): Promise<any> {",
            "  const { frame: __stack, restored: __restored } = __state.stack.getNewState(false);",
            "  if (!__restored) {",
            "    __stack.args = { x };",
            "  }",
            "  try {",
            "    if (__stack.step <= 0) {",
            "      __stack.locals.y = __stack.args.x + __stack.args.x;",
            "      __stack.step = 1;",
            "    }",
            "    if (__stack.step <= 1) {",
            "      return __stack.locals.y;",
            "    }",
            "  } finally {",
            "    __state.stack.pop(__stack);",
            "  }",
            "}",
        ]
    );
}

#[test]
fn test_comments_and_blank_lines_are_not_steps() {
    let output = compile("def f() {\n  // first\n  a = 1\n\n  b = 2\n}\n");
    assert!(output.contains("if (__stack.step <= 1) {"));
    assert!(!output.contains("if (__stack.step <= 2) {"));
}

#[test]
fn test_independent_async_calls_run_in_parallel() {
    let output = compile(
        "def a() {\n  return 1\n}\n\nnode main() {\n  x = a()\n  y = a()\n  print(x, y)\n}\n",
    );
    assert_eq!(
        block(&output, "async function __node_main")[7..18].to_vec(),
        vec![
            "    await Promise.all([",
            "      (async () => {",
            "        if (__stack.step <= 0) {",
            "          __stack.locals.x = await a(__state);",
            "        }",
            "      })(),",
            "      (async () => {",
            "        if (__stack.step <= 1) {",
            "          __stack.locals.y = await a(__state);",
            "        }",
            "      })(),",
        ]
    );
    assert!(output.contains("    if (__stack.step <= 1) __stack.step = 2;"));
    assert!(output.contains("      await print(__stack.locals.x, __stack.locals.y);"));
}

#[test]
fn test_interrupt_propagates_through_callers() {
    let source = r#"def approve(amount: number) {
  return interrupt("Refund ${amount}?")
}

node refund(amount: number) {
  ok = approve(amount)
  print(ok)
}
"#;
    let output = compile(source);
    assert!(output.contains("      const __t0 = __interrupt(__state, `Refund ${__stack.args.amount}?`);"));
    assert!(output.contains("      const __t0 = await approve(__stack.args.amount, __state);"));
    assert!(output.contains("      if (isInterrupt(__t0)) return __t0;"));
    assert!(output.contains("      __stack.locals.ok = __t0;"));
    assert!(!output.contains("Promise.all"));
}

#[test]
fn test_interrupting_tool_makes_prompt_check() {
    let source = r#"def refund(orderId: string) {
  """Refund an order."""
  ok = interrupt("Refund ${orderId}?")
  return ok
}

node support(message: string) {
  +refund
  answer = `Help the customer: ${message}`
  print(answer)
}
"#;
    let output = compile(source);
    assert!(output.contains(
        "const __t0 = await __runPrompt(__state, { prompt: `Help the customer: ${__stack.args.message}`, tools: [__tool_refund], handlers: { refund: __handler_refund } });"
    ));
    assert!(output.contains("if (isInterrupt(__t0)) return __t0;"));
    assert!(output.contains(r#"export const __tool_refund = {"name":"refund","description":"Refund an order.","#));
}

#[test]
fn test_graph_lowering() {
    let source = r#"node main(x) {
  if (x) {
    return left(x)
  }
  return right()
}

node left(v) {
  print(v)
}

node right() {
  print("r")
}
"#;
    let output = compile(source);
    assert!(output.contains("    __state.stack.nodesTraversed.push(\"main\");"));
    assert!(output.contains("    __stack.args = { x: __arg(data, 0, \"x\") };"));
    assert!(output.contains("        return goToNode(\"left\", [__stack.args.x]);"));
    assert!(output.contains("      return goToNode(\"right\", []);"));
    assert_eq!(
        block(&output, "export function __registerGraph"),
        vec![
            "export function __registerGraph(graph: any): void {",
            "  graph.node(\"main\", __adapt(__node_main));",
            "  graph.conditionalEdge(\"main\", [\"left\", \"right\"], __route);",
            "  graph.node(\"left\", __adapt(__node_left));",
            "  graph.node(\"right\", __adapt(__node_right));",
            "}",
        ]
    );
    assert!(output.contains("export async function runNode("));
    assert!(output.contains("export async function resumeFromInterrupt("));
}

#[test]
fn test_node_call_must_be_returned() {
    let err = compile_with(
        "node a() {\n  b()\n}\n\nnode b() {\n  print(1)\n}\n",
        &CodegenOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        &err,
        CodegenError::NodeCallNotReturned { node, caller } if node == "b" && caller == "a"
    ));
    assert!(err.to_string().contains("must be returned"));
}

#[test]
fn test_excluded_builtin() {
    let options = CodegenOptions {
        excluded_builtins: vec!["fetch".to_string()],
        ..CodegenOptions::default()
    };
    let err = compile_with("node main() {\n  page = fetch(\"https://example.com\")\n}\n", &options)
        .unwrap_err();
    assert!(matches!(err, CodegenError::ExcludedBuiltin { ref name, .. } if name == "fetch"));

    let output = compile_with("x = 1\n", &options).unwrap();
    let import = output.lines().nth(1).unwrap();
    assert!(import.contains(" fetchJSON,"));
    assert!(!import.contains(" fetch,"));
}

#[test]
fn test_unknown_tool() {
    let err = compile_with("node main() {\n  +missing\n  x = `hi`\n}\n", &CodegenOptions::default())
        .unwrap_err();
    assert!(matches!(err, CodegenError::UnknownTool { ref name, .. } if name == "missing"));
}

#[test]
fn test_structured_response_format() {
    let source = "type Coords = { x: number; y: number }\n\nnode main(city: string) {\n  coords: Coords = `Where is ${city}?`\n}\n";
    let output = compile(source);
    assert!(output.contains("export type Coords = { x: number; y: number };"));
    assert!(output.contains(
        r#"responseFormat: {"type":"json_schema","json_schema":{"name":"response","strict":true,"schema":{"type":"object","properties":{"value":{"type":"object","properties":{"x":{"type":"number"},"y":{"type":"number"}},"required":["x","y"],"additionalProperties":false}},"required":["value"],"additionalProperties":false}}}"#
    ));
}

#[test]
fn test_streaming_prompt() {
    let output = compile("node main() {\n  story = stream `Tell a story`\n}\n");
    assert!(output.contains("handlers: {}, stream: true })"));
}

#[test]
fn test_while_condition_that_can_interrupt() {
    let source = "def ask() {\n  return interrupt(\"more?\")\n}\n\nnode main() {\n  while (ask()) {\n    print(\"again\")\n  }\n}\n";
    let output = compile(source);
    assert!(output.contains("      while (true) {"));
    assert!(output.contains("        const __t0 = await ask(__state);"));
    assert!(output.contains("        if (!(__t0)) break;"));
}

#[test]
fn test_match_lowering() {
    let source = "node main(mood: string) {\n  match(mood) {\n    \"happy\" => print(\"yay\")\n    _ => print(\"meh\")\n  }\n}\n";
    let output = compile(source);
    assert!(output.contains("      const __m0 = __stack.args.mood;"));
    assert!(output.contains("      if (__m0 === \"happy\") {"));
    assert!(output.contains("        await print(\"meh\");"));
}

#[test]
fn test_module_level_statements() {
    let output = compile("@model = \"gpt-4o\"\nx = 5\nprint(x)\n");
    assert!(output.contains("let x: any;"));
    assert!(output.contains("__config.model = \"gpt-4o\";"));
    assert!(output.ends_with("x = 5;\nawait print(x);\n"));
    assert!(!output.contains("export function __registerGraph"));
}

#[test]
fn test_imports() {
    let source = "import { readFile } from \"fs\"\nimport node { triage } from \"./triage.agency\"\nimport tool { search } from \"./tools.agency\"\n\nnode main() {\n  +search\n  x = `find it`\n  return triage(x)\n}\n";
    let output = compile(source);
    assert!(output.contains("import { readFile } from \"fs\";"));
    assert!(output.contains("import { __tool_search, __handler_search } from \"./tools.js\";"));
    assert!(output.contains("import { __registerGraph as __registerGraph_triage } from \"./triage.js\";"));
    assert!(output.contains("  __registerGraph_triage(graph);"));
    assert!(output.contains("return goToNode(\"triage\", [__stack.locals.x]);"));
    assert!(output.contains("graph.conditionalEdge(\"main\", [\"triage\"], __route);"));
}

#[test]
fn test_only_interrupting_definitions_restore_frames() {
    let source = r#"def total(a: number, b: number) {
  return a + b
}

def ask(n: number) {
  return interrupt("Continue with ${n}?")
}

node main() {
  y = ask(total(1, 2))
  if (total(3, 4) > 1) {
    z = ask(1)
  }
}
"#;
    let output = compile(source);
    let restore = "  const { frame: __stack, restored: __restored } = __state.stack.getNewState";
    assert!(block(&output, "export async function total").contains(&format!("{restore}(false);").as_str()));
    assert!(block(&output, "export async function ask").contains(&format!("{restore}(true);").as_str()));
    assert!(block(&output, "async function __node_main").contains(&format!("{restore}(true);").as_str()));
    assert!(output.contains("restorable && this.mode === \"deserialize\" ? this.deserializeStack.shift() : undefined;"));
}

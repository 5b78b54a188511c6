//! Graph-node lowering, edges and the exported runners.
//!
//! A node body returns `goToNode(target, args)` where the source says
//! `return target(...)`. Every such target becomes part of the node's
//! conditional edge; `__route` reads the chosen target back out of the
//! graph state.

use super::context::{BodyVariables, ModuleInfo};
use super::expr::{Body, BodyKind};
use super::schema::quote;
use super::tools::module_specifier;
use super::writer::CodeWriter;
use crate::error::CodegenError;
use agency_parser::walk::walk_nodes;
use agency_parser::{GraphNodeDefinition, Node};
use indexmap::IndexSet;
use tracing::debug;

/// Graph nodes `def` can hand control to, in source order.
pub fn node_targets(def: &GraphNodeDefinition, is_graph_node: impl Fn(&str) -> bool) -> Vec<String> {
    let mut targets = IndexSet::new();
    walk_nodes(&def.body, &mut |node, ctx| {
        if ctx.scope.is_some() {
            return;
        }
        if let Node::Return { value: Some(value) } = node {
            if let Node::FunctionCall(call) = value.as_ref() {
                if is_graph_node(&call.function_name) {
                    targets.insert(call.function_name.clone());
                }
            }
        }
    });
    targets.into_iter().collect()
}

pub(crate) fn emit_node(
    w: &mut CodeWriter,
    module: &ModuleInfo<'_>,
    def: &GraphNodeDefinition,
) -> Result<(), CodegenError> {
    let name = &def.node_name;
    let vars = BodyVariables::scan(def.parameters.iter().map(|p| p.name.clone()), &def.body);
    let mut body = Body::new(module, BodyKind::GraphNode, name.clone(), vars);

    let args: Vec<String> = def
        .parameters
        .iter()
        .enumerate()
        .map(|(index, p)| format!("{}: __arg(data, {}, {})", p.name, index, quote(&p.name)))
        .collect();

    w.open(&format!(
        "async function __node_{}(data: any, __state: RunState): Promise<any> {{",
        name
    ));
    w.line("const { frame: __stack, restored: __restored } = __state.stack.getNewState(true);");
    w.open("if (!__restored) {");
    w.line(&format!("__state.stack.nodesTraversed.push({});", quote(name)));
    w.line(&frame_args(&args));
    w.close("}");
    w.open("try {");
    let steps = body.emit_steps(w, &def.body)?;
    w.reopen("} finally {");
    w.line("__state.stack.pop(__stack);");
    w.close("}");
    w.close("}");
    debug!(node = %name, steps, "lowered graph node");
    Ok(())
}

/// `__stack.args = { ... };`
pub(crate) fn frame_args(entries: &[String]) -> String {
    if entries.is_empty() {
        "__stack.args = {};".to_string()
    } else {
        format!("__stack.args = {{ {} }};", entries.join(", "))
    }
}

/// Imports of other modules' graph registrations, one per module.
pub(crate) fn node_imports(module: &ModuleInfo<'_>) -> Vec<(String, String)> {
    let paths: IndexSet<&str> = module.imported_nodes.values().copied().collect();
    paths
        .into_iter()
        .map(|path| {
            let alias = format!("__registerGraph_{}", module_ident(path));
            let line = format!(
                "import {{ __registerGraph as {} }} from {};",
                alias,
                quote(&module_specifier(path))
            );
            (alias, line)
        })
        .collect()
}

/// Identifier-safe form of a module path's file stem.
fn module_ident(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.split('.').next().unwrap_or(file);
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Graph registration plus `runNode` and `resumeFromInterrupt`.
pub(crate) fn emit_graph(w: &mut CodeWriter, module: &ModuleInfo<'_>) -> Result<(), CodegenError> {
    let imports = node_imports(module);
    if module.graph_nodes.is_empty() && imports.is_empty() {
        return Ok(());
    }

    w.open("export function __registerGraph(graph: any): void {");
    for (alias, _) in &imports {
        w.line(&format!("{}(graph);", alias));
    }
    for (name, def) in &module.graph_nodes {
        w.line(&format!("graph.node({}, __adapt(__node_{}));", quote(name), name));
        let targets = node_targets(def, |n| module.is_graph_node(n));
        if !targets.is_empty() {
            let targets: Vec<String> = targets.iter().map(|t| quote(t)).collect();
            w.line(&format!(
                "graph.conditionalEdge({}, [{}], __route);",
                quote(name),
                targets.join(", ")
            ));
        }
    }
    w.close("}");
    w.blank();
    w.lines(RUNNERS);
    Ok(())
}

const RUNNERS: &str = r#"const graph = new SimpleMachine<GraphState>();
__registerGraph(graph);

export async function runNode(name: string, args: any = {}, __state: RunState = __newRunState()): Promise<any> {
  const final = await graph.run(name, { data: args, __state });
  return final.result;
}

export async function resumeFromInterrupt(raised: any, response: InterruptResponse): Promise<any> {
  const saved = raised.state;
  const __state: RunState = {
    stack: StateStack.fromJSON(saved.stack),
    resume: response,
    pending: saved.toolCall ? saved : undefined,
  };
  const node = __state.stack.nodesTraversed[__state.stack.nodesTraversed.length - 1];
  if (node === undefined) {
    throw new Error("interrupt carries no graph node to resume");
  }
  return runNode(node, {}, __state);
}"#;

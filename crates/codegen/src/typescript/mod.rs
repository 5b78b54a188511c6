//! TypeScript backend.
//!
//! [`generate_typescript`] turns a preprocessed program into one
//! self-contained module:
//!
//! 1. runtime imports, pass-through imports, node and tool imports
//! 2. the prelude (`StateStack`, `__runPrompt`, graph adapters)
//! 3. type aliases
//! 4. functions, each followed by its tool definition and handler
//! 5. graph nodes, their registration and the exported runners
//! 6. module-level statements
//!
//! Functions and graph nodes are lowered into step machines (see [`steps`]).

mod context;
mod expr;
mod graph;
mod prelude;
pub mod schema;
pub mod steps;
mod tools;
mod writer;

pub use graph::node_targets;
pub use prelude::{BUILTINS, CORE_IMPORTS};
pub use steps::{plan_steps, step_statements, StepGroup};

use crate::error::CodegenError;
use agency_graph::PreprocessedProgram;
use agency_parser::{FunctionDefinition, Node};
use context::{BodyVariables, ModuleInfo, MODULE_OWNER};
use expr::{Body, BodyKind};
use schema::{quote, ts_type};
use serde::{Deserialize, Serialize};
use tracing::debug;
use writer::CodeWriter;

/// Default module the generated code imports its runtime from.
pub const DEFAULT_RUNTIME_MODULE: &str = "agency-lang/runtime";

/// Options for TypeScript generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodegenOptions {
    /// Built-ins left out of the runtime import. Calling one is an error.
    pub excluded_builtins: Vec<String>,
    /// Module specifier of the runtime.
    pub runtime_module: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            excluded_builtins: Vec::new(),
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
        }
    }
}

/// Generate the TypeScript module for `preprocessed`.
pub fn generate_typescript(
    preprocessed: &PreprocessedProgram,
    options: &CodegenOptions,
) -> Result<String, CodegenError> {
    let module = ModuleInfo::new(preprocessed, options);
    let nodes = &preprocessed.program.nodes;
    debug!(
        functions = module.functions.len(),
        graph_nodes = module.graph_nodes.len(),
        "generating TypeScript"
    );

    let mut w = CodeWriter::new();
    w.line("// Generated by agencyc. Do not edit.");
    w.line(&prelude::runtime_import(&options.runtime_module, &options.excluded_builtins));
    emit_imports(&mut w, &module, nodes);
    w.blank();
    w.lines(prelude::PRELUDE);
    w.blank();
    w.line("const __state: RunState = __newRunState();");

    if module.aliases.iter().next().is_some() {
        w.blank();
        for (name, ty) in module.aliases.iter() {
            w.line(&format!("export type {} = {};", name, ts_type(ty)));
        }
    }

    let module_vars = BodyVariables::scan(Vec::new(), nodes);
    if !module_vars.locals.is_empty() {
        w.blank();
        let names: Vec<&str> = module_vars.locals.iter().map(String::as_str).collect();
        w.line(&format!("let {}: any;", names.join(": any, ")));
    }

    for def in module.functions.values() {
        w.blank();
        emit_function(&mut w, &module, def)?;
        tools::emit_tool(&mut w, &module, def)?;
    }
    for def in module.graph_nodes.values() {
        w.blank();
        graph::emit_node(&mut w, &module, def)?;
    }
    w.blank();
    graph::emit_graph(&mut w, &module)?;

    let mut top = Body::new(&module, BodyKind::Module, MODULE_OWNER, module_vars);
    w.blank();
    top.emit_sequence(&mut w, nodes)?;
    Ok(w.finish())
}

fn emit_imports(w: &mut CodeWriter, module: &ModuleInfo<'_>, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::ImportStatement {
                import_clause,
                module_path,
            } => w.line(&format!("import {} from {};", import_clause, quote(module_path))),
            Node::ImportToolStatement {
                tool_names,
                module_path,
            } => w.line(&tools::tool_import(tool_names, module_path)),
            _ => {}
        }
    }
    for (_, line) in graph::node_imports(module) {
        w.line(&line);
    }
}

fn emit_function(
    w: &mut CodeWriter,
    module: &ModuleInfo<'_>,
    def: &FunctionDefinition,
) -> Result<(), CodegenError> {
    let name = &def.function_name;
    let vars = BodyVariables::scan(def.parameters.iter().map(|p| p.name.clone()), &def.body);
    let mut body = Body::new(module, BodyKind::Function, name.clone(), vars);

    let mut params: Vec<String> = def
        .parameters
        .iter()
        .map(|p| {
            let ty = p.type_hint.as_ref().map(ts_type).unwrap_or_else(|| "any".to_string());
            format!("{}: {}", p.name, ty)
        })
        .collect();
    params.push("__state: RunState = __newRunState()".to_string());
    let names: Vec<String> = def.parameters.iter().map(|p| p.name.clone()).collect();

    if let Some(doc) = &def.docstring {
        w.line(&format!("/** {} */", doc.trim().replace("*/", "*\\/")));
    }
    w.open(&format!(
        "export async function {}({}): Promise<any> {{",
        name,
        params.join(", ")
    ));
    let restorable = module.definition_can_interrupt(name, &def.body);
    w.line(&format!(
        "const {{ frame: __stack, restored: __restored }} = __state.stack.getNewState({});",
        restorable
    ));
    w.open("if (!__restored) {");
    w.line(&graph::frame_args(&names));
    w.close("}");
    w.open("try {");
    let steps = body.emit_steps(w, &def.body)?;
    w.reopen("} finally {");
    w.line("__state.stack.pop(__stack);");
    w.close("}");
    w.close("}");
    debug!(function = %name, steps, is_async = ?def.is_async, restorable, "lowered function");
    Ok(())
}

//! Tool definitions and handlers.
//!
//! Every function is exported as a tool so prompts here, and modules that
//! `import tool { ... }` it, can hand it to the model. The handler unpacks
//! the model's named arguments into the positional call.

use super::context::ModuleInfo;
use super::expr::Body;
use super::schema::{parameters_schema, quote};
use super::writer::CodeWriter;
use crate::error::CodegenError;
use agency_parser::{FunctionDefinition, PromptLiteral};
use serde_json::json;

pub(crate) fn emit_tool(
    w: &mut CodeWriter,
    module: &ModuleInfo<'_>,
    def: &FunctionDefinition,
) -> Result<(), CodegenError> {
    let name = &def.function_name;
    let definition = json!({
        "name": name,
        "description": def.docstring.clone().unwrap_or_default(),
        "schema": parameters_schema(&def.parameters, &module.aliases),
    });
    w.line(&format!(
        "export const __tool_{} = {};",
        name,
        serde_json::to_string(&definition)?
    ));
    let mut args: Vec<String> = def
        .parameters
        .iter()
        .map(|p| format!("args.{}", p.name))
        .collect();
    args.push("__state".to_string());
    w.line(&format!(
        "export const __handler_{} = (args: any, __state: RunState) => {}({});",
        name,
        name,
        args.join(", ")
    ));
    Ok(())
}

/// `import tool { a } from "./tools.agency"` as a TypeScript import.
pub(crate) fn tool_import(names: &[String], module_path: &str) -> String {
    let imports: Vec<String> = names
        .iter()
        .map(|n| format!("__tool_{n}, __handler_{n}"))
        .collect();
    format!(
        "import {{ {} }} from {};",
        imports.join(", "),
        quote(&module_specifier(module_path))
    )
}

/// Map an Agency module path to the compiled module it becomes.
pub(crate) fn module_specifier(path: &str) -> String {
    match path.strip_suffix(".agency") {
        Some(stem) => format!("{}.js", stem),
        None => path.to_string(),
    }
}

impl Body<'_, '_> {
    /// The `tools` array and `handlers` entries for a prompt.
    pub(crate) fn prompt_tools(&self, prompt: &PromptLiteral) -> Result<(Vec<String>, Vec<String>), CodegenError> {
        let mut tools = Vec::with_capacity(prompt.tools.len());
        let mut handlers = Vec::with_capacity(prompt.tools.len());
        for tool in &prompt.tools {
            if !self.module.is_tool(tool) {
                return Err(CodegenError::UnknownTool {
                    name: tool.clone(),
                    caller: self.owner.clone(),
                });
            }
            tools.push(format!("__tool_{}", tool));
            handlers.push(format!("{}: __handler_{}", tool, tool));
        }
        Ok((tools, handlers))
    }
}

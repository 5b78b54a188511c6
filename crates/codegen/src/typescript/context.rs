//! Lookup tables shared by every emitted body.

use super::CodegenOptions;
use agency_graph::{PreprocessedProgram, INTERRUPT_BUILTIN};
use agency_parser::walk::walk_nodes;
use agency_parser::{FunctionDefinition, GraphNodeDefinition, Node, PromptLiteral, VariableType};
use agency_typecheck::TypeAliases;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Owner name used in diagnostics for top-level statements.
pub(crate) const MODULE_OWNER: &str = "<module>";

/// Program-wide facts the lowering consults.
pub(crate) struct ModuleInfo<'a> {
    pub preprocessed: &'a PreprocessedProgram,
    pub options: &'a CodegenOptions,
    pub aliases: TypeAliases,
    pub functions: IndexMap<&'a str, &'a FunctionDefinition>,
    pub graph_nodes: IndexMap<&'a str, &'a GraphNodeDefinition>,
    /// Graph nodes imported from other Agency modules, with their module path.
    pub imported_nodes: IndexMap<&'a str, &'a str>,
    /// Tools imported from other Agency modules, with their module path.
    pub imported_tools: IndexMap<&'a str, &'a str>,
}

impl<'a> ModuleInfo<'a> {
    pub fn new(preprocessed: &'a PreprocessedProgram, options: &'a CodegenOptions) -> Self {
        let nodes = &preprocessed.program.nodes;
        let mut functions = IndexMap::new();
        let mut graph_nodes = IndexMap::new();
        let mut imported_nodes = IndexMap::new();
        let mut imported_tools = IndexMap::new();
        walk_nodes(nodes, &mut |node, _| match node {
            Node::Function(def) => {
                functions.entry(def.function_name.as_str()).or_insert(def);
            }
            Node::GraphNode(def) => {
                graph_nodes.entry(def.node_name.as_str()).or_insert(def);
            }
            Node::ImportNodeStatement {
                node_names,
                module_path,
            } => {
                for name in node_names {
                    imported_nodes.entry(name.as_str()).or_insert(module_path.as_str());
                }
            }
            Node::ImportToolStatement {
                tool_names,
                module_path,
            } => {
                for name in tool_names {
                    imported_tools.entry(name.as_str()).or_insert(module_path.as_str());
                }
            }
            _ => {}
        });
        Self {
            preprocessed,
            options,
            aliases: TypeAliases::collect(nodes),
            functions,
            graph_nodes,
            imported_nodes,
            imported_tools,
        }
    }

    pub fn is_graph_node(&self, name: &str) -> bool {
        !self.functions.contains_key(name)
            && (self.graph_nodes.contains_key(name) || self.imported_nodes.contains_key(name))
    }

    pub fn is_tool(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.imported_tools.contains_key(name)
    }

    pub fn is_excluded_builtin(&self, name: &str) -> bool {
        self.options.excluded_builtins.iter().any(|b| b == name)
    }

    /// Whether a plain call to `name` may hand back an interrupt.
    pub fn call_can_interrupt(&self, name: &str) -> bool {
        if self.functions.contains_key(name) {
            return self.preprocessed.can_interrupt(name);
        }
        name == INTERRUPT_BUILTIN
    }

    /// Whether running `prompt` may hand back an interrupt from one of its
    /// tools. Imported tools are assumed to.
    pub fn prompt_can_interrupt(&self, prompt: &PromptLiteral) -> bool {
        prompt.tools.iter().any(|tool| {
            self.imported_tools.contains_key(tool.as_str()) || self.preprocessed.can_interrupt(tool)
        })
    }

    /// Whether the definition `name` with `body` may hand back an interrupt.
    /// Only such definitions take saved frames when a run resumes.
    pub fn definition_can_interrupt(&self, name: &str, body: &[Node]) -> bool {
        self.preprocessed.can_interrupt(name) || body.iter().any(|node| self.can_interrupt(node))
    }

    /// Whether evaluating `node` (or anything nested in it) may interrupt.
    pub fn can_interrupt(&self, node: &Node) -> bool {
        let mut found = false;
        walk_nodes(std::slice::from_ref(node), &mut |node, _| match node {
            Node::FunctionCall(call) if self.call_can_interrupt(&call.function_name) => found = true,
            Node::Prompt(prompt) if self.prompt_can_interrupt(prompt) => found = true,
            _ => {}
        });
        found
    }
}

/// Names a body stores in its frame, and the declared types of its variables.
#[derive(Debug, Default)]
pub(crate) struct BodyVariables {
    pub params: IndexSet<String>,
    pub locals: IndexSet<String>,
    pub declared: HashMap<String, VariableType>,
}

impl BodyVariables {
    /// Scan `body` without entering nested definitions.
    pub fn scan(params: impl IntoIterator<Item = String>, body: &[Node]) -> Self {
        let params: IndexSet<String> = params.into_iter().collect();
        let mut locals = IndexSet::new();
        let mut declared = HashMap::new();
        walk_nodes(body, &mut |node, ctx| {
            if ctx.scope.is_some() {
                return;
            }
            match node {
                Node::Assignment {
                    variable_name,
                    type_hint,
                    ..
                } => {
                    if !params.contains(variable_name) {
                        locals.insert(variable_name.clone());
                    }
                    if let Some(ty) = type_hint {
                        declared.entry(variable_name.clone()).or_insert_with(|| ty.clone());
                    }
                }
                Node::TypeHint {
                    variable_name,
                    variable_type,
                } => {
                    declared
                        .entry(variable_name.clone())
                        .or_insert_with(|| variable_type.clone());
                }
                _ => {}
            }
        });
        Self {
            params,
            locals,
            declared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_parser::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_skips_nested_definitions() {
        let program = parse(
            "a: number = 1\nif (a) {\n  b = 2\n}\ndef inner() {\n  c = 3\n}\nx :: string\n",
        )
        .unwrap();
        let vars = BodyVariables::scan(vec!["a".to_string()], &program.nodes);
        assert_eq!(vars.locals.iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(vars.declared.get("a"), Some(&VariableType::primitive("number")));
        assert_eq!(vars.declared.get("x"), Some(&VariableType::primitive("string")));
        assert!(!vars.declared.contains_key("c"));
    }
}

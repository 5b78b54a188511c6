//! # agency-graph
//!
//! Call-graph analysis and the preprocessing passes for Agency programs.
//!
//! This crate builds a call graph from a parsed [`Program`] and runs the
//! passes that annotate a clone of the tree before type checking and code
//! generation:
//!
//! - **Tool collection**: `+tool` markers attach to the next prompt and are stripped
//! - **Interrupt reachability**: which definitions can suspend on an `interrupt`
//! - **Async taint**: unset `async` flags are inferred callees-first
//! - **Fetch domain policy**: literal `fetch` URLs are checked against allow/deny lists
//! - **Call-flow rendering**: a Mermaid diagram of each body's calls
//!
//! ## Example
//!
//! ```rust
//! use agency_graph::{preprocess, CallGraph, PreprocessOptions};
//!
//! let source = r#"
//! def approve(amount: number) {
//!   return interrupt("refund ${amount}?")
//! }
//!
//! def summarize(text: string) {
//!   return `Summarize ${text}`
//! }
//! "#;
//!
//! let program = agency_parser::parse(source).unwrap();
//! let graph = CallGraph::from_program(&program);
//! assert_eq!(graph.node_count(), 2);
//!
//! let result = preprocess(&program, &PreprocessOptions::default()).unwrap();
//! assert_eq!(result.async_functions.get("approve"), Some(&false));
//! assert_eq!(result.async_functions.get("summarize"), Some(&true));
//! ```

mod builder;
mod edges;
mod error;
mod nodes;
pub mod preprocess;
mod queries;
pub mod render;

pub use builder::{CallGraphBuilder, INTERRUPT_BUILTIN};
pub use edges::CallEdge;
pub use error::PreprocessError;
pub use nodes::CallNode;
pub use queries::GraphStats;
pub use preprocess::{preprocess, PreprocessOptions, PreprocessedProgram};
pub use render::render_call_flow;

use agency_parser::Program;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// A call graph built from an Agency program.
///
/// Nodes are function and graph-node definitions; edges point from caller to
/// callee. Calls to built-ins and imported names are not represented.
#[derive(Debug, Clone)]
pub struct CallGraph {
    /// The underlying directed graph
    graph: DiGraph<CallNode, CallEdge>,

    /// Index of definition nodes by name
    definitions: HashMap<String, NodeIndex>,
}

impl CallGraph {
    /// Build a call graph from a parsed program.
    pub fn from_program(program: &Program) -> Self {
        CallGraphBuilder::new().build(program)
    }

    /// Get the underlying petgraph for advanced operations.
    pub fn inner(&self) -> &DiGraph<CallNode, CallEdge> {
        &self.graph
    }

    /// Get a node by its index.
    pub fn get_node(&self, index: NodeIndex) -> Option<&CallNode> {
        self.graph.node_weight(index)
    }

    /// Look up a definition by name.
    pub fn get_definition(&self, name: &str) -> Option<NodeIndex> {
        self.definitions.get(name).copied()
    }

    /// Get all definition names, in source order.
    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(CallNode::name)
    }

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(source: &str) -> CallGraph {
        let program = agency_parser::parse(source).unwrap();
        CallGraph::from_program(&program)
    }

    #[test]
    fn test_empty_graph() {
        let graph = graph("x = 1\n");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_definitions_in_source_order() {
        let graph = graph("def a() {\n  b()\n}\ndef b() {\n  print(1)\n}\nnode main() {\n  a()\n}\n");
        assert_eq!(graph.definition_names().collect::<Vec<_>>(), vec!["a", "b", "main"]);
        // print is a built-in and stays out of the graph
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_direct_interrupt_is_recorded() {
        let graph = graph("def ask() {\n  if (x) {\n    interrupt(\"ok?\")\n  }\n}\ndef quiet() {\n  print(1)\n}\n");
        let ask = graph.get_definition("ask").unwrap();
        let quiet = graph.get_definition("quiet").unwrap();
        assert!(graph.get_node(ask).unwrap().calls_interrupt());
        assert!(!graph.get_node(quiet).unwrap().calls_interrupt());
    }

    #[test]
    fn test_edge_kinds() {
        let graph = graph(
            "def lookup() {\n  return 1\n}\nnode main() {\n  +lookup\n  x = `find it`\n  return done(x)\n}\nnode done(x) {\n  print(x)\n}\n",
        );
        let main = graph.get_definition("main").unwrap();
        let mut edges: Vec<(&str, &str)> = graph
            .inner()
            .edges(main)
            .map(|e| {
                use petgraph::visit::EdgeRef;
                (graph.inner()[e.target()].name(), e.weight().label())
            })
            .collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![("done", "goes_to"), ("lookup", "uses_tool")]);
    }

    #[test]
    fn test_repeated_calls_share_one_edge() {
        let graph = graph("def f() {\n  g()\n  g()\n}\ndef g() {\n  return 1\n}\n");
        assert_eq!(graph.edge_count(), 1);
    }
}

//! Builder for constructing a CallGraph from a program.

use crate::edges::CallEdge;
use crate::nodes::CallNode;
use crate::CallGraph;
use agency_parser::walk::walk_nodes;
use agency_parser::{Node, Program};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Name of the built-in that suspends execution pending approval.
pub const INTERRUPT_BUILTIN: &str = "interrupt";

/// Builder for constructing a call graph from a program.
pub struct CallGraphBuilder {
    graph: DiGraph<CallNode, CallEdge>,
    definitions: HashMap<String, NodeIndex>,
}

impl Default for CallGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            definitions: HashMap::new(),
        }
    }

    /// Build a CallGraph from a program.
    pub fn build(mut self, program: &Program) -> CallGraph {
        // Phase 1: one node per definition, at any depth
        self.add_definitions(program);

        // Phase 2: edges for every call, tool marker and prompt tool list
        self.add_call_edges(program);

        tracing::debug!(
            definitions = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "built call graph"
        );

        CallGraph {
            graph: self.graph,
            definitions: self.definitions,
        }
    }

    fn add_definitions(&mut self, program: &Program) {
        walk_nodes(&program.nodes, &mut |node, _| {
            let call_node = match node {
                Node::Function(def) => CallNode::Function {
                    name: def.function_name.clone(),
                    declared_async: def.is_async,
                    calls_interrupt: false,
                },
                Node::GraphNode(def) => CallNode::GraphNode {
                    name: def.node_name.clone(),
                    calls_interrupt: false,
                },
                _ => return,
            };
            let name = call_node.name().to_string();
            if self.definitions.contains_key(&name) {
                tracing::debug!(%name, "duplicate definition ignored in call graph");
                return;
            }
            let idx = self.graph.add_node(call_node);
            self.definitions.insert(name, idx);
        });
    }

    fn add_call_edges(&mut self, program: &Program) {
        let mut pending: Vec<(NodeIndex, String, CallEdge)> = Vec::new();
        let mut interrupting: Vec<NodeIndex> = Vec::new();

        walk_nodes(&program.nodes, &mut |node, ctx| {
            let Some(caller) = ctx
                .scope
                .as_deref()
                .and_then(|scope| self.definitions.get(scope).copied())
            else {
                return;
            };
            match node {
                Node::FunctionCall(call) if call.function_name == INTERRUPT_BUILTIN => {
                    interrupting.push(caller);
                }
                Node::FunctionCall(call) => {
                    pending.push((caller, call.function_name.clone(), CallEdge::Calls));
                }
                Node::UsesTool { tool_names } => {
                    for tool in tool_names {
                        pending.push((caller, tool.clone(), CallEdge::UsesTool));
                    }
                }
                Node::Prompt(prompt) => {
                    for tool in &prompt.tools {
                        pending.push((caller, tool.clone(), CallEdge::UsesTool));
                    }
                }
                _ => {}
            }
        });

        for caller in interrupting {
            if let Some(weight) = self.graph.node_weight_mut(caller) {
                weight.mark_interrupt();
            }
        }

        for (caller, callee_name, edge) in pending {
            // Calls to built-ins and imported names stay out of the graph
            let Some(&callee) = self.definitions.get(&callee_name) else {
                continue;
            };
            let edge = match (edge, &self.graph[caller], &self.graph[callee]) {
                (CallEdge::Calls, CallNode::GraphNode { .. }, CallNode::GraphNode { .. }) => {
                    CallEdge::GoesTo
                }
                (edge, _, _) => edge,
            };
            let exists = self
                .graph
                .edges_connecting(caller, callee)
                .any(|e| *e.weight() == edge);
            if !exists {
                self.graph.add_edge(caller, callee, edge);
            }
        }
    }
}

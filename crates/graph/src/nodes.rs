//! Node types for the call graph.

use serde::{Deserialize, Serialize};

/// A node in the call graph: one definition of the program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallNode {
    /// A `def` function definition
    Function {
        /// Function name
        name: String,
        /// Explicit `async`/`sync` flag from the source, if any
        declared_async: Option<bool>,
        /// Whether the body calls the `interrupt` built-in itself
        calls_interrupt: bool,
    },

    /// A `node` graph-node definition
    GraphNode {
        /// Graph node name
        name: String,
        /// Whether the body calls the `interrupt` built-in itself
        calls_interrupt: bool,
    },
}

impl CallNode {
    /// Get a human-readable label for this node.
    pub fn label(&self) -> String {
        match self {
            CallNode::Function { name, .. } => format!("def:{}", name),
            CallNode::GraphNode { name, .. } => format!("node:{}", name),
        }
    }

    /// Get the definition name.
    pub fn name(&self) -> &str {
        match self {
            CallNode::Function { name, .. } | CallNode::GraphNode { name, .. } => name,
        }
    }

    /// Whether the body calls `interrupt` directly.
    pub fn calls_interrupt(&self) -> bool {
        match self {
            CallNode::Function {
                calls_interrupt, ..
            }
            | CallNode::GraphNode {
                calls_interrupt, ..
            } => *calls_interrupt,
        }
    }

    pub(crate) fn mark_interrupt(&mut self) {
        match self {
            CallNode::Function {
                calls_interrupt, ..
            }
            | CallNode::GraphNode {
                calls_interrupt, ..
            } => *calls_interrupt = true,
        }
    }

    /// Check if this node is a function definition.
    pub fn is_function(&self) -> bool {
        matches!(self, CallNode::Function { .. })
    }

    /// Check if this node is a graph node.
    pub fn is_graph_node(&self) -> bool {
        matches!(self, CallNode::GraphNode { .. })
    }
}

//! Edge types for the call graph.

use serde::{Deserialize, Serialize};

/// An edge in the call graph, from caller to callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallEdge {
    /// Plain call `name(...)`
    Calls,

    /// A prompt in the caller may invoke the callee as an LLM tool (`+name`)
    UsesTool,

    /// A graph node hands control to another graph node (`return next(...)`)
    GoesTo,
}

impl CallEdge {
    /// Get a human-readable label for this edge type.
    pub fn label(&self) -> &'static str {
        match self {
            CallEdge::Calls => "calls",
            CallEdge::UsesTool => "uses_tool",
            CallEdge::GoesTo => "goes_to",
        }
    }

    /// Whether the callee runs inside the caller's invocation.
    ///
    /// A `GoesTo` transition runs the target after the caller has returned,
    /// so an interrupt raised there never suspends the caller.
    pub fn runs_in_caller(&self) -> bool {
        matches!(self, CallEdge::Calls | CallEdge::UsesTool)
    }
}

//! Error types for code generation.

use thiserror::Error;

/// Errors that stop code generation for a program.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A graph node was called somewhere other than `return node(...)`.
    #[error("call to graph node '{node}' in '{caller}' must be returned (write `return {node}(...)`)")]
    NodeCallNotReturned { node: String, caller: String },

    /// A call to a built-in that this build leaves out.
    #[error("built-in function '{name}' is excluded from this build (called in '{caller}')")]
    ExcludedBuiltin { name: String, caller: String },

    /// A `+tool` name that is neither defined nor imported as a tool.
    #[error("unknown tool '{name}' used in '{caller}'")]
    UnknownTool { name: String, caller: String },

    /// A statement-only node appeared where a value was expected.
    #[error("'{kind}' cannot be used as a value (in '{owner}')")]
    InvalidExpression { kind: &'static str, owner: String },

    /// Schema or payload serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#![recursion_limit = "512"]

//! # agency-parser
//!
//! Parser, AST and formatter for Agency, a small language for LLM agent
//! workflows.
//!
//! This crate provides:
//!
//! - **Parsing** of Agency source into a typed [`Program`]
//! - **Structured errors** with spans, rendered through ariadne
//! - **A shared walker** ([`walk`]) used by every later pass
//! - **Formatting** back to source ([`serialize`]) that round-trips
//! - **JSON serialization** of the AST (`{"type": "assignment", ...}`)
//!
//! ## Quick Start
//!
//! ```rust
//! use agency_parser::{parse, Node};
//!
//! let source = r#"
//! type Coords = { x: number; y: number }
//!
//! def locate(city: string): Coords {
//!   return fetchJSON("https://geo.example.com/${city}")
//! }
//!
//! node main(city: string) {
//!   coords: Coords = `Where is ${city}?`
//!   print(coords)
//! }
//! "#;
//!
//! let program = parse(source).unwrap();
//! assert_eq!(program.functions().count(), 1);
//! assert!(matches!(program.nodes.last(), Some(Node::GraphNode(_))));
//! ```
//!
//! ## Language Overview
//!
//! | Construct | Syntax |
//! |-----------|--------|
//! | Assignment | `x = 5`, `x: number = 5` |
//! | Type hint / alias | `x :: number`, `type P = { a: string }` |
//! | Function | `def f(a: number, b) { ... }` |
//! | Graph node | `node main() { ... }` |
//! | Control flow | `if`, `while`, `match`, `time` |
//! | Prompt | `` `Summarize ${text}` `` |
//! | Tool marker | `+search` (attaches to the next prompt) |
//!
//! ## Module Overview
//!
//! - [`ast`] - Abstract Syntax Tree types
//! - [`parser`] - chumsky combinator grammar
//! - [`error`] - Error types with pretty printing via ariadne
//! - [`walk`] - Tree traversal shared by all passes
//! - [`serializer`] - AST to source formatter
//!
//! ## JSON Serialization
//!
//! ```rust
//! let program = agency_parser::parse("x = 5").unwrap();
//! let json = serde_json::to_value(&program.nodes[0]).unwrap();
//! assert_eq!(json["type"], "assignment");
//! assert_eq!(json["variableName"], "x");
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod walk;

// Re-export commonly used types
pub use ast::{
    BinOp, FunctionCall, FunctionDefinition, FunctionParameter, GraphNodeDefinition, MatchCase,
    MatchPattern, Node, ObjectEntry, ObjectProperty, Program, PromptLiteral, PromptSegment,
    VariableType,
};
pub use error::{ErrorReporter, ParseError, ParseErrorInfo};
pub use parser::{parse, parse_expression, parse_type, parse_with_structured_errors};
pub use serializer::{format_type, serialize, serialize_with, FormatOptions};
pub use walk::{walk_nodes, walk_nodes_mut, WalkContext};

/// Parse Agency source and return the tree as pretty-printed JSON.
///
/// ```rust
/// let json = agency_parser::parse_to_json("x = 5").unwrap();
/// assert!(json.contains("\"assignment\""));
/// ```
pub fn parse_to_json(source: &str) -> Result<String, ParseError> {
    let program = parse(source)?;
    Ok(serde_json::to_string_pretty(&program).unwrap_or_else(|_| "{}".to_string()))
}

//! # agency-codegen
//!
//! Lowers preprocessed Agency programs to TypeScript.
//!
//! Each function and graph node becomes a **resumable step machine**: its
//! body is split into numbered steps behind guards on a per-invocation frame,
//! and every local lives in that frame. When a tool call needs human
//! approval the frame stack is serialized into the interrupt; answering it
//! restores the frames and re-enters the body at the step that was running.
//!
//! - [`typescript`] - the backend ([`generate_typescript`])
//! - [`frames`] - a Rust model of the generated frame stack
//!
//! ## Example
//!
//! ```rust
//! use agency_codegen::{generate_typescript, CodegenOptions};
//! use agency_graph::{preprocess, PreprocessOptions};
//!
//! let source = r#"
//! def greet(name: string) {
//!   return `Say hello to ${name}`
//! }
//!
//! node main(name: string) {
//!   greeting = greet(name)
//!   print(greeting)
//! }
//! "#;
//!
//! let program = agency_parser::parse(source).unwrap();
//! let preprocessed = preprocess(&program, &PreprocessOptions::default()).unwrap();
//! let ts = generate_typescript(&preprocessed, &CodegenOptions::default()).unwrap();
//!
//! assert!(ts.contains("export async function greet(name: string, __state: RunState = __newRunState())"));
//! assert!(ts.contains("graph.node(\"main\", __adapt(__node_main));"));
//! ```

pub mod error;
pub mod frames;
pub mod typescript;

pub use error::CodegenError;
pub use frames::{Frame, FrameStack, InterruptResponse, InterruptState, SavedStack, StackMode};
pub use typescript::{generate_typescript, CodegenOptions, DEFAULT_RUNTIME_MODULE};

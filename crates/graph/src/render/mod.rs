//! Graph rendering utilities.
//!
//! This module renders developer-facing diagrams of a program:
//! - Mermaid call-flow charts, one subgraph per function or graph node

mod mermaid;

pub use mermaid::render_call_flow;

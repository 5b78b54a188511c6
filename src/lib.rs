//! # agency
//!
//! Agency is a small language for LLM agent workflows. Programs are
//! parsed, preprocessed, type checked and compiled to TypeScript whose
//! functions and graph nodes can stop on a human-approval interrupt and
//! later resume from the exact step they were on.
//!
//! | Crate | Re-exported as | Contents |
//! |-------|----------------|----------|
//! | [`agency-parser`] | [`parser`] | Grammar, AST, walker, formatter |
//! | [`agency-graph`] | [`graph`] | Call graph, preprocessing passes, fetch policy |
//! | [`agency-typecheck`] | [`typecheck`] | Scopes, inference, assignability |
//! | [`agency-codegen`] | [`codegen`] | TypeScript step machines, frame-stack model |
//!
//! ## Quick Start
//!
//! ```rust
//! use agency::{compile, AgencyConfig};
//!
//! let source = r#"
//! def approve(amount: number) {
//!   return interrupt("Refund ${amount}?")
//! }
//!
//! node main(amount: number) {
//!   ok = approve(amount)
//!   print(ok)
//! }
//! "#;
//!
//! let compiled = compile(source, &AgencyConfig::default()).unwrap();
//! assert!(compiled.type_errors.is_empty());
//! assert!(compiled.preprocessed.can_interrupt("approve"));
//! assert!(compiled.typescript.contains("export async function resumeFromInterrupt("));
//! ```

pub mod config;

pub use agency_codegen as codegen;
pub use agency_graph as graph;
pub use agency_parser as parser;
pub use agency_typecheck as typecheck;

pub use agency_codegen::{generate_typescript, CodegenError, CodegenOptions, FrameStack, InterruptResponse};
pub use agency_graph::{preprocess, render_call_flow, CallGraph, PreprocessError, PreprocessOptions, PreprocessedProgram};
pub use agency_parser::{
    parse, serialize, serialize_with, ErrorReporter, FormatOptions, Node, ParseError, Program,
};
pub use agency_typecheck::{check, TypeCheckError, TypeCheckOptions, TypeCheckResult};
pub use config::AgencyConfig;

use thiserror::Error;
use tracing::{debug, info};

/// Why a compilation stopped.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    /// Only raised with `strictTypes`; otherwise type errors are reported in
    /// [`Compiled::type_errors`].
    #[error("{} type error(s); first: {}", .0.len(), .0.first().map(|e| e.message.as_str()).unwrap_or(""))]
    TypeCheck(Vec<TypeCheckError>),

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),
}

/// The products of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The tree as parsed, untouched by preprocessing.
    pub program: Program,
    pub preprocessed: PreprocessedProgram,
    pub type_errors: Vec<TypeCheckError>,
    pub typescript: String,
}

/// Parse, preprocess, type check and generate TypeScript.
///
/// Nothing is generated for a program that fails to parse or preprocess.
pub fn compile(source: &str, config: &AgencyConfig) -> Result<Compiled, CompileError> {
    let program = parse(source)?;
    debug!(statements = program.nodes.len(), "parsed");

    let preprocessed = preprocess(&program, &config.preprocess_options())?;
    let result = check(&preprocessed.program, &config.typecheck_options());
    if !result.is_ok() {
        debug!(errors = result.errors.len(), "type check reported errors");
        if config.strict_types {
            return Err(CompileError::TypeCheck(result.errors));
        }
    }

    let typescript = generate_typescript(&preprocessed, &config.codegen_options())?;
    info!(bytes = typescript.len(), "compiled");
    Ok(Compiled {
        program,
        preprocessed,
        type_errors: result.errors,
        typescript,
    })
}

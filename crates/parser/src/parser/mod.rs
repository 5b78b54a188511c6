//! Parser for Agency source code.
//!
//! This module converts Agency source text into a [`Program`].
//!
//! # Architecture
//!
//! The grammar is a set of chumsky combinators applied directly to the
//! characters of the source; there is no separate tokenization pass.
//! Alternatives are tried in order and backtrack on failure, repetition
//! always consumes input, and errors carry the span where the most input was
//! consumed.
//!
//! # Usage
//!
//! ```rust
//! use agency_parser::parser::parse;
//!
//! let program = parse("x = 5\n").unwrap();
//! assert_eq!(program.nodes[0].type_name(), "assignment");
//!
//! let err = parse("x = [1, 2\n").unwrap_err();
//! assert!(err.message.contains("line 1"));
//! ```
//!
//! # Module Structure
//!
//! - `primitives` - whitespace, identifiers, keywords, segmented text
//! - `literals` - numbers, strings, booleans, prompts
//! - `types` - type annotations
//! - `expressions` - access chains, binary operations, arrays, objects
//! - `statements` - line-level statements and bodies
//! - `control_flow` - if/while/match/time
//! - `definitions` - `def` and `node`
//! - `imports` - import variants

mod control_flow;
mod definitions;
mod expressions;
mod imports;
mod literals;
mod primitives;
mod statements;
mod types;

use crate::ast::{Node, Program, VariableType};
use crate::error::{ParseError, ParseErrorInfo};
use chumsky::prelude::*;

pub use expressions::expression;
pub use primitives::Span;
pub use statements::statement;

/// Convert a byte offset to (line, column), both 1-indexed.
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Get the line content at a given line number (1-indexed).
fn get_line_content(source: &str, line_num: usize) -> &str {
    source.lines().nth(line_num.saturating_sub(1)).unwrap_or("")
}

/// Format a structured error into a human-readable string with line/column info.
fn format_parse_error(source: &str, error: &ParseErrorInfo) -> String {
    let span = error.span.clone().unwrap_or(0..0);
    let (line, col) = offset_to_line_col(source, span.start);
    let line_content = get_line_content(source, line);

    let expected_str = match error.expected.len() {
        0 => String::new(),
        1 => format!(", expected {}", error.expected[0]),
        _ => format!(", expected one of: {}", error.expected.join(", ")),
    };

    let found_str = match &error.found {
        Some(found) => format!("found '{}'", found.escape_debug()),
        None => "found end of input".to_string(),
    };

    let context_str = if error.contexts.is_empty() {
        String::new()
    } else {
        let labels: Vec<String> = error
            .contexts
            .iter()
            .map(|(label, ctx_span)| {
                let (ctx_line, _) = offset_to_line_col(source, ctx_span.start);
                format!("{} (line {})", label, ctx_line)
            })
            .collect();
        format!("\n  while parsing: {}", labels.join(" > "))
    };

    format!(
        "Error at line {}, column {}: {}{}{}\n  |\n{:>3} | {}\n  | {}{}",
        line,
        col,
        found_str,
        expected_str,
        context_str,
        line,
        line_content,
        " ".repeat(col.saturating_sub(1)),
        "^".repeat(
            (span.end - span.start)
                .max(1)
                .min(line_content.len().saturating_sub(col - 1).max(1))
        )
    )
}

/// Convert a chumsky error into a structured error.
fn to_error_info(source: &str, error: &Rich<'_, char, Span>) -> ParseErrorInfo {
    let span = error.span();
    let (line, col) = offset_to_line_col(source, span.start);
    let contexts = error
        .contexts()
        .map(|(label, ctx_span)| (label.to_string(), ctx_span.start..ctx_span.end))
        .collect();

    ParseErrorInfo {
        message: format!("Parse error at line {}, column {}: {}", line, col, error.reason()),
        span: Some(span.start..span.end),
        expected: error.expected().map(|exp| exp.to_string()).collect(),
        found: error.found().map(|c| c.to_string()),
        contexts,
    }
}

/// Parse Agency source into a program and every error encountered.
pub fn parse_with_structured_errors(source: &str) -> (Option<Program>, Vec<ParseErrorInfo>) {
    let (nodes, errs) = statements::program_lines()
        .parse(source)
        .into_output_errors();
    let errors: Vec<ParseErrorInfo> = errs.iter().map(|e| to_error_info(source, e)).collect();
    tracing::trace!(
        bytes = source.len(),
        errors = errors.len(),
        "parsed agency source"
    );
    (nodes.map(Program::new), errors)
}

/// Parse Agency source code into a [`Program`].
///
/// Returns `Ok` only when parsing succeeds with no errors; no partial tree is
/// ever returned alongside an error.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let (program, errors) = parse_with_structured_errors(source);
    match program {
        Some(program) if errors.is_empty() => Ok(program),
        _ => {
            let errors = if errors.is_empty() {
                vec![ParseErrorInfo {
                    message: "Unknown parse error".to_string(),
                    span: None,
                    expected: vec![],
                    found: None,
                    contexts: vec![],
                }]
            } else {
                errors
            };
            let message = errors
                .iter()
                .map(|e| format_parse_error(source, e))
                .collect::<Vec<_>>()
                .join("\n");
            tracing::debug!(errors = errors.len(), "parse failed");
            Err(ParseError { message, errors })
        }
    }
}

/// Parse a single expression (the whole input must be consumed).
pub fn parse_expression(source: &str) -> Result<Node, ParseError> {
    single(expressions::expression(), source)
}

/// Parse a single type annotation (the whole input must be consumed).
pub fn parse_type(source: &str) -> Result<VariableType, ParseError> {
    single(types::variable_type(), source)
}

fn single<'src, O>(
    parser: impl Parser<'src, &'src str, O, primitives::Extra<'src>>,
    source: &'src str,
) -> Result<O, ParseError> {
    parser
        .padded_by(primitives::ws())
        .then_ignore(end())
        .parse(source)
        .into_result()
        .map_err(|errs| {
            let errors: Vec<ParseErrorInfo> = errs.iter().map(|e| to_error_info(source, e)).collect();
            let message = errors
                .iter()
                .map(|e| format_parse_error(source, e))
                .collect::<Vec<_>>()
                .join("\n");
            ParseError { message, errors }
        })
}

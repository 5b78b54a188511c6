//! Error types and error reporting for Agency.
//!
//! Parse failures are plain values: [`ParseErrorInfo`] records one failure
//! with its span, and [`ParseError`] collects every failure of a parse. The
//! [`ErrorReporter`] renders them with [ariadne](https://crates.io/crates/ariadne).
//!
//! ```rust
//! use agency_parser::error::{ErrorReporter, ParseErrorInfo};
//!
//! let source = "x = [1, 2";
//! let reporter = ErrorReporter::new("main.agency", source);
//!
//! let error = ParseErrorInfo {
//!     message: "Parse error at line 1, column 10: unexpected end of input".to_string(),
//!     span: Some(9..9),
//!     expected: vec!["']'".to_string()],
//!     found: None,
//!     contexts: vec![],
//! };
//! let rendered = reporter.render_parse_error(&error);
//! assert!(rendered.contains("unexpected end of input"));
//! ```

use ariadne::{Color, Label, Report, ReportKind, Source};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Information about a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseErrorInfo {
    pub message: String,
    pub span: Option<Range<usize>>,
    pub expected: Vec<String>,
    pub found: Option<String>,
    /// Context chain from labelled parsers, outermost first.
    pub contexts: Vec<(String, Range<usize>)>,
}

impl ParseErrorInfo {
    /// Byte offset where the failure was detected.
    pub fn position(&self) -> usize {
        self.span.as_ref().map(|span| span.start).unwrap_or(0)
    }
}

impl fmt::Display for ParseErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref found) = self.found {
            write!(f, ", found '{}'", found)?;
        }
        if !self.expected.is_empty() {
            write!(f, ", expected one of: {}", self.expected.join(", "))?;
        }
        Ok(())
    }
}

/// A failed parse.
///
/// `message` is a human-readable summary (line, column and a caret under the
/// offending source line); `errors` holds the structured failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub errors: Vec<ParseErrorInfo>,
}

impl ParseError {
    /// Byte offset of the first failure.
    pub fn position(&self) -> usize {
        self.errors.first().map(ParseErrorInfo::position).unwrap_or(0)
    }
}

/// Error reporter that uses ariadne for pretty error output.
pub struct ErrorReporter<'src> {
    source_name: String,
    source: &'src str,
}

impl<'src> ErrorReporter<'src> {
    /// Create a new error reporter.
    pub fn new(source_name: impl Into<String>, source: &'src str) -> Self {
        Self {
            source_name: source_name.into(),
            source,
        }
    }

    fn build_report(&self, error: &ParseErrorInfo) -> Report<'_, (&str, Range<usize>)> {
        let span = error.span.clone().unwrap_or(0..0);
        let name = self.source_name.as_str();

        let mut label = Label::new((name, span.clone())).with_color(Color::Red);
        if let Some(ref found) = error.found {
            label = label.with_message(format!("found '{}'", found));
        }

        let mut report = Report::build(ReportKind::Error, name, span.start)
            .with_message(&error.message)
            .with_label(label);

        for (i, (ctx_label, ctx_span)) in error.contexts.iter().enumerate() {
            let color = if i == 0 { Color::Yellow } else { Color::Cyan };
            report = report.with_label(
                Label::new((name, ctx_span.clone()))
                    .with_color(color)
                    .with_message(format!("while parsing {}", ctx_label))
                    .with_order(i as i32 + 1),
            );
        }

        if !error.expected.is_empty() {
            report = report.with_note(format!("expected one of: {}", error.expected.join(", ")));
        }

        report.finish()
    }

    /// Render a parse error to a string (colors disabled by the caller's terminal).
    pub fn render_parse_error(&self, error: &ParseErrorInfo) -> String {
        let mut buffer = Vec::new();
        let written = self
            .build_report(error)
            .write((self.source_name.as_str(), Source::from(self.source)), &mut buffer);
        match written {
            Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => error.to_string(),
        }
    }

    /// Report a parse error to stderr.
    pub fn report_parse_error(&self, error: &ParseErrorInfo) {
        let printed = self
            .build_report(error)
            .eprint((self.source_name.as_str(), Source::from(self.source)));
        if printed.is_err() {
            eprintln!("{}", error);
        }
    }

    /// Report every failure of a parse to stderr.
    pub fn report(&self, error: &ParseError) {
        for info in &error.errors {
            self.report_parse_error(info);
        }
    }
}

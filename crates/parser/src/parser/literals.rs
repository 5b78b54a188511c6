//! Literal parsers: numbers, strings, booleans and prompts.

use crate::ast::{Node, PromptLiteral};
use chumsky::prelude::*;

use super::primitives::{hws, kw, number_text, segmented, Extra};

/// `42`, `-1.5`
pub(crate) fn number<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    number_text().map(|value| Node::Number { value })
}

/// `"text ${name}"`
pub(crate) fn string<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    segmented("\"").map(|segments| Node::String { segments })
}

/// `"""text ${name}"""` (may span lines).
pub(crate) fn multi_line_string<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone
{
    segmented("\"\"\"").map(|segments| Node::MultiLineString { segments })
}

/// `true` / `false`
pub(crate) fn boolean<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    choice((
        kw("true").to(Node::Boolean { value: true }),
        kw("false").to(Node::Boolean { value: false }),
    ))
    .labelled("boolean")
}

/// A backtick prompt, optionally prefixed with `stream`.
pub(crate) fn prompt<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    kw("stream")
        .then(hws())
        .or_not()
        .then(segmented("`"))
        .map(|(stream, segments)| {
            Node::Prompt(PromptLiteral {
                segments,
                tools: Vec::new(),
                is_streaming: stream.is_some(),
                is_async: None,
            })
        })
        .labelled("prompt")
}

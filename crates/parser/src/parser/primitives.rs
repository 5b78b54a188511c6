//! Primitive parsers for basic tokens.
//!
//! Agency is parsed at the character level, so this module plays the role a
//! lexer would otherwise play: whitespace handling, identifiers, keywords,
//! quoted text with escapes and `${name}` interpolation, and the line
//! terminator used by statement bodies.

use crate::ast::PromptSegment;
use chumsky::prelude::*;

/// Character span type.
pub type Span = SimpleSpan<usize>;

/// Parser extra state: rich errors over characters.
pub type Extra<'src> = extra::Err<Rich<'src, char, Span>>;

/// Words that can never be used as a variable name.
pub const RESERVED_WORDS: &[&str] = &[
    "def", "if", "else", "while", "match", "return", "await", "true", "false", "import", "async",
    "sync",
];

/// Inline whitespace: spaces, tabs and carriage returns. Never a newline.
pub fn hws<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\r").repeated().ignored()
}

/// At least one inline whitespace character.
pub fn hws1<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\r").repeated().at_least(1).ignored()
}

/// Any whitespace including newlines (used inside brackets).
pub fn ws<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\r\n").repeated().ignored()
}

/// An identifier, returned as an owned string.
pub fn ident<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    text::ident().map(|s: &str| s.to_string()).labelled("identifier")
}

/// An identifier that is not a reserved word.
pub fn name<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    text::ident()
        .try_map(|s: &str, span| {
            if RESERVED_WORDS.contains(&s) {
                Err(Rich::custom(span, format!("'{}' is a reserved word", s)))
            } else {
                Ok(s.to_string())
            }
        })
        .labelled("name")
}

/// A keyword: the word itself, not followed by further identifier characters.
pub fn kw<'src>(word: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    text::keyword(word).ignored()
}

/// `,` surrounded by any whitespace.
pub fn comma<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just(',').padded_by(ws()).ignored()
}

/// Consume characters up to (not including) `terminator`, returning the slice.
///
/// Zero-width repetition cannot loop: each iteration consumes one character.
pub fn take_until<'src>(
    terminator: &'static str,
) -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .and_is(just(terminator).not())
        .repeated()
        .to_slice()
}

/// Number text: optional minus, integer part, optional fraction.
pub fn number_text<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('-')
        .or_not()
        .then(text::int(10))
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("number")
}

/// A double-quoted string without escapes or interpolation (module paths,
/// quoted object keys, literal types).
pub fn plain_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    none_of("\"\n")
        .repeated()
        .to_slice()
        .map(|s: &str| s.to_string())
        .delimited_by(just('"'), just('"'))
        .labelled("string")
}

// ============================================================================
// Segmented text
// ============================================================================

/// One scanned piece of a segmented literal before merging.
#[derive(Debug, Clone)]
enum Piece {
    Char(char),
    Var(String),
}

/// Decode the character following a backslash.
fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

/// Merge scanned pieces into alternating text/interpolation segments.
fn merge_pieces(pieces: Vec<Piece>) -> Vec<PromptSegment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    for piece in pieces {
        match piece {
            Piece::Char(c) => text.push(c),
            Piece::Var(variable_name) => {
                if !text.is_empty() {
                    segments.push(PromptSegment::Text {
                        value: std::mem::take(&mut text),
                    });
                }
                segments.push(PromptSegment::Interpolation { variable_name });
            }
        }
    }
    if !text.is_empty() {
        segments.push(PromptSegment::Text { value: text });
    }
    segments
}

/// Text between two `delimiter`s, split into segments.
///
/// Supports `${name}` interpolation and backslash escapes (`\n`, `\t`, `\r`,
/// and any other character taken literally, e.g. `\"` or `\${`).
pub fn segmented<'src>(
    delimiter: &'static str,
) -> impl Parser<'src, &'src str, Vec<PromptSegment>, Extra<'src>> + Clone {
    let interpolation = just("${")
        .ignore_then(text::ident().padded_by(hws()))
        .then_ignore(just('}'))
        .map(|s: &str| Piece::Var(s.to_string()));

    let escape = just('\\').ignore_then(any()).map(|c| Piece::Char(unescape(c)));

    let plain = any().and_is(just(delimiter).not()).map(Piece::Char);

    choice((interpolation, escape, plain))
        .repeated()
        .collect::<Vec<_>>()
        .map(merge_pieces)
        .delimited_by(just(delimiter), just(delimiter))
}

// ============================================================================
// Lines
// ============================================================================

/// The end of a statement: an optional `;`, then a newline, a closing brace,
/// a comment or the end of input must follow. Nothing is consumed except the
/// semicolon and trailing inline whitespace.
pub fn terminator<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    hws()
        .then(just(';').or_not())
        .then(hws())
        .then(
            choice((
                just('\n').ignored(),
                just('}').ignored(),
                just("//").ignored(),
                just("/*").ignored(),
                end(),
            ))
            .rewind(),
        )
        .ignored()
        .labelled("end of line")
}

/// Fold raw body lines into nodes.
///
/// A line break directly after a statement only ends that statement; every
/// other line break is a blank line and becomes [`crate::ast::Node::NewLine`].
/// `after_open` is true for brace-delimited bodies, whose opening line break
/// is not blank.
pub fn fold_lines(
    lines: Vec<Option<crate::ast::Node>>,
    after_open: bool,
) -> Vec<crate::ast::Node> {
    let mut nodes = Vec::new();
    let mut after_statement = after_open;
    for line in lines {
        match line {
            Some(node) => {
                nodes.push(node);
                after_statement = true;
            }
            None if after_statement => after_statement = false,
            None => nodes.push(crate::ast::Node::NewLine),
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_segmented_interpolation() {
        let result = segmented("`").parse("`Hello ${name}!`").into_result().unwrap();
        assert_eq!(
            result,
            vec![
                PromptSegment::Text {
                    value: "Hello ".to_string()
                },
                PromptSegment::Interpolation {
                    variable_name: "name".to_string()
                },
                PromptSegment::Text {
                    value: "!".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_segmented_escapes() {
        let result = segmented("\"").parse(r#""a\"b\n\${x}""#).into_result().unwrap();
        assert_eq!(
            result,
            vec![PromptSegment::Text {
                value: "a\"b\n${x}".to_string()
            }]
        );
    }

    #[test]
    fn test_segmented_empty() {
        let result = segmented("\"").parse("\"\"").into_result().unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text().parse("-1.5").into_result().unwrap(), "-1.5");
        assert_eq!(number_text().parse("42").into_result().unwrap(), "42");
        assert!(number_text().parse("abc").has_errors());
    }

    #[test]
    fn test_name_rejects_reserved() {
        assert!(name().parse("return").has_errors());
        assert_eq!(name().parse("returned").into_result().unwrap(), "returned");
    }

    #[test]
    fn test_take_until() {
        let parser = take_until("*/").then_ignore(just("*/"));
        assert_eq!(parser.parse(" a * b */").into_result().unwrap(), " a * b ");
    }

    #[test]
    fn test_fold_lines() {
        use crate::ast::Node;
        let x = Node::variable("x");
        let folded = fold_lines(vec![None, Some(x.clone()), None, None], true);
        assert_eq!(folded, vec![x.clone(), Node::NewLine]);

        let folded = fold_lines(vec![None, Some(x.clone()), None], false);
        assert_eq!(folded, vec![Node::NewLine, x]);
    }
}

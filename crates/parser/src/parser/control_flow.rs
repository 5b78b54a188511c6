//! Control flow parsers: `if`/`else`, `while`, `match` and `time` blocks.
//!
//! Each parser receives the expression parser and the statement parser it
//! nests, so it can be built inside the statement recursion.

use crate::ast::{MatchCase, MatchPattern, Node};
use chumsky::prelude::*;

use super::primitives::{hws, kw, ws, Extra};
use super::statements::block;

/// `(expr)` with any whitespace inside the parentheses.
fn condition<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    expr.delimited_by(just('(').then(ws()), ws().then(just(')')))
        .labelled("condition")
}

/// `if (cond) { ... } else if (cond) { ... } else { ... }`
///
/// `else if` is stored as an else body holding a single `ifElse` node.
pub(crate) fn if_else<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    recursive(move |if_else| {
        let else_branch = ws()
            .then(kw("else"))
            .then(hws())
            .ignore_then(choice((
                if_else.map(|node| vec![node]),
                block(stmt.clone()),
            )));

        kw("if")
            .then(hws())
            .ignore_then(condition(expr.clone()))
            .then_ignore(hws())
            .then(block(stmt.clone()))
            .then(else_branch.or_not())
            .map(|((condition, then_body), else_body)| Node::IfElse {
                condition: Box::new(condition),
                then_body,
                else_body,
            })
            .labelled("if statement")
    })
}

/// `while (cond) { ... }`
pub(crate) fn while_loop<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    kw("while")
        .then(hws())
        .ignore_then(condition(expr))
        .then_ignore(hws())
        .then(block(stmt))
        .map(|(condition, body)| Node::WhileLoop {
            condition: Box::new(condition),
            body,
        })
        .labelled("while loop")
}

/// `time { ... }`
pub(crate) fn time_block<'src>(
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    kw("time")
        .then(hws())
        .ignore_then(block(stmt))
        .map(|body| Node::TimeBlock { body })
        .labelled("time block")
}

/// ```text
/// match(expr) {
///   "a" => stmt
///   1 => stmt, _ => stmt
/// }
/// ```
pub(crate) fn match_block<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    let pattern = choice((kw("_").to(MatchPattern::Default), expr.clone().map(MatchPattern::Literal)))
        .labelled("match pattern");

    let case = pattern
        .then_ignore(just("=>").padded_by(hws()))
        .then(stmt)
        .map(|(pattern, body)| MatchCase {
            pattern,
            body: Box::new(body),
        });

    let case_sep = choice((just(',').ignored(), just('\n').ignored()))
        .padded_by(hws())
        .then(ws());

    kw("match")
        .then(hws())
        .ignore_then(condition(expr))
        .then_ignore(hws())
        .then(
            case.separated_by(case_sep)
                .allow_trailing()
                .collect::<Vec<_>>()
                .delimited_by(just('{').then(ws()), ws().then(just('}'))),
        )
        .map(|(expression, cases)| Node::MatchBlock {
            expression: Box::new(expression),
            cases,
        })
        .labelled("match block")
}

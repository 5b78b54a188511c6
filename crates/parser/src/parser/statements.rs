//! Statement parsers and statement bodies.
//!
//! A body is a sequence of lines. Each line is tried against the statement
//! parsers in priority order:
//!
//! | Priority | Construct | Example |
//! |----------|-----------|---------|
//! | 1 | comments | `// note`, `/* note */` |
//! | 2 | type alias / type hint | `type P = {x: number}`, `x :: number` |
//! | 3 | imports | `import node { a } from "./a.agency"` |
//! | 4 | tool marker / special variable | `+search`, `@model = "gpt-4o"` |
//! | 5 | definitions | `def f() { }`, `node main() { }` |
//! | 6 | control flow | `if`, `while`, `match`, `time` |
//! | 7 | `return` | `return x` |
//! | 8 | assignment | `x: number = 5` |
//! | 9 | bare expression | `print(x)`, `await f()` |

use crate::ast::Node;
use chumsky::prelude::*;

use super::control_flow::{if_else, match_block, time_block, while_loop};
use super::definitions::{function_definition, graph_node_definition};
use super::expressions::expression;
use super::imports::{import_node_statement, import_statement, import_tool_statement};
use super::primitives::{fold_lines, hws, hws1, ident, kw, name, take_until, terminator, ws, Extra};
use super::types::variable_type;

/// One raw line of a body: a statement, or `None` for a line break.
pub(crate) fn line<'src>(
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Option<Node>, Extra<'src>> + Clone + 'src {
    hws().ignore_then(choice((
        just('\n').to(None),
        stmt.then_ignore(terminator()).map(Some),
    )))
}

/// `{ lines }`
pub(crate) fn block<'src>(
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Vec<Node>, Extra<'src>> + Clone + 'src {
    line(stmt)
        .repeated()
        .collect::<Vec<_>>()
        .map(|lines| fold_lines(lines, true))
        .delimited_by(just('{'), hws().then(just('}')))
        .labelled("block")
}

fn comment<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    just("//")
        .ignore_then(none_of('\n').repeated().to_slice())
        .map(|content: &str| Node::Comment {
            content: content.to_string(),
        })
}

fn multi_line_comment<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    take_until("*/")
        .delimited_by(just("/*"), just("*/"))
        .map(|content: &str| Node::MultiLineComment {
            content: content.to_string(),
        })
}

/// `type Name = Type`
fn type_alias<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    kw("type")
        .then(hws1())
        .ignore_then(ident())
        .then_ignore(just('=').padded_by(hws()))
        .then(variable_type())
        .map(|(alias_name, aliased_type)| Node::TypeAlias {
            alias_name,
            aliased_type,
        })
        .labelled("type alias")
}

/// `name :: Type`
fn type_hint<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    name()
        .then_ignore(just("::").padded_by(hws()))
        .then(variable_type())
        .map(|(variable_name, variable_type)| Node::TypeHint {
            variable_name,
            variable_type,
        })
        .labelled("type hint")
}

/// `+toolA, toolB`
fn uses_tool<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    just('+')
        .then(hws())
        .ignore_then(
            ident()
                .separated_by(just(',').padded_by(hws()))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .map(|tool_names| Node::UsesTool { tool_names })
        .labelled("tool marker")
}

/// `@name = expr`
fn special_var<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    just('@')
        .ignore_then(ident())
        .then_ignore(just('=').padded_by(hws()))
        .then(expr)
        .map(|(name, value)| Node::SpecialVar {
            name,
            value: Box::new(value),
        })
        .labelled("special variable")
}

/// `return` or `return expr`
fn return_statement<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    kw("return")
        .ignore_then(hws1().ignore_then(expr).or_not())
        .map(|value| Node::Return {
            value: value.map(Box::new),
        })
        .labelled("return")
}

/// `name = expr` or `name: Type = expr`
fn assignment<'src>(
    expr: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    let annotation = just(':')
        .padded_by(hws())
        .ignore_then(variable_type())
        .then_ignore(hws());

    name()
        .then(annotation.or_not())
        .then_ignore(hws())
        .then_ignore(just('=').then(just('=').not()))
        .then_ignore(hws())
        .then(expr)
        .map(|((variable_name, type_hint), value)| Node::Assignment {
            variable_name,
            type_hint,
            value: Box::new(value),
        })
        .labelled("assignment")
}

/// Parse a single statement (one line, possibly spanning nested bodies).
pub fn statement<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    recursive(|stmt| {
        let expr = expression();

        let declarations = choice((
            comment(),
            multi_line_comment(),
            type_alias(),
            type_hint(),
            import_node_statement(),
            import_tool_statement(),
            import_statement(),
            uses_tool(),
            special_var(expr.clone()),
        ))
        .boxed();

        let definitions = choice((
            function_definition(stmt.clone()),
            graph_node_definition(stmt.clone()),
        ))
        .boxed();

        let control_flow = choice((
            if_else(expr.clone(), stmt.clone()),
            while_loop(expr.clone(), stmt.clone()),
            match_block(expr.clone(), stmt.clone()),
            time_block(stmt),
        ))
        .boxed();

        choice((
            declarations,
            definitions,
            control_flow,
            return_statement(expr.clone()),
            assignment(expr.clone()),
            expr,
        ))
    })
    .boxed()
}

/// Top-level lines until end of input.
pub(crate) fn program_lines<'src>(
) -> impl Parser<'src, &'src str, Vec<Node>, Extra<'src>> + Clone {
    line(statement())
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(ws())
        .then_ignore(end())
        .map(|lines| fold_lines(lines, false))
}

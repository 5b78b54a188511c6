//! Import statement parsers.
//!
//! ```text
//! import { a, b } from "./lib.js"          (passed through to the target)
//! import node { main } from "./flow.agency"
//! import tool { search } from "./tools.agency"
//! ```

use crate::ast::Node;
use chumsky::prelude::*;

use super::primitives::{comma, hws, hws1, ident, kw, plain_string, ws, Extra};

/// `"path"` or `'path'`
fn module_path<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    choice((
        plain_string(),
        none_of("'\n")
            .repeated()
            .to_slice()
            .map(|s: &str| s.to_string())
            .delimited_by(just('\''), just('\'')),
    ))
    .labelled("module path")
}

/// `{ a, b }`
fn name_list<'src>() -> impl Parser<'src, &'src str, Vec<String>, Extra<'src>> + Clone {
    ident()
        .separated_by(comma())
        .allow_trailing()
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just('{').then(ws()), ws().then(just('}')))
}

/// `from "path"` with leading whitespace.
fn from_clause<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    hws()
        .then(kw("from"))
        .then(hws())
        .ignore_then(module_path())
}

/// `import node { a, b } from "path"`
pub(crate) fn import_node_statement<'src>(
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    kw("import")
        .then(hws1())
        .then(kw("node"))
        .then(hws())
        .ignore_then(name_list())
        .then(from_clause())
        .map(|(node_names, module_path)| Node::ImportNodeStatement {
            node_names,
            module_path,
        })
        .labelled("node import")
}

/// `import tool { a, b } from "path"`
pub(crate) fn import_tool_statement<'src>(
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    kw("import")
        .then(hws1())
        .then(kw("tool"))
        .then(hws())
        .ignore_then(name_list())
        .then(from_clause())
        .map(|(tool_names, module_path)| Node::ImportToolStatement {
            tool_names,
            module_path,
        })
        .labelled("tool import")
}

/// `import <clause> from "path"`: the clause is kept verbatim.
pub(crate) fn import_statement<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone
{
    let clause = none_of("\n")
        .and_is(hws1().then(kw("from")).not())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.trim().to_string());

    kw("import")
        .then(hws1())
        .ignore_then(clause)
        .then(from_clause())
        .map(|(import_clause, module_path)| Node::ImportStatement {
            import_clause,
            module_path,
        })
        .labelled("import")
}

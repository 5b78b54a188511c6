//! Function and graph-node definition parsers.

use crate::ast::{FunctionDefinition, FunctionParameter, GraphNodeDefinition, Node, PromptSegment};
use chumsky::prelude::*;

use super::primitives::{comma, hws, hws1, ident, kw, ws, Extra};
use super::statements::block;
use super::types::variable_type;

/// `(a: number, b)`
fn parameters<'src>() -> impl Parser<'src, &'src str, Vec<FunctionParameter>, Extra<'src>> + Clone
{
    let parameter = ident()
        .then(just(':').padded_by(hws()).ignore_then(variable_type()).or_not())
        .map(|(name, type_hint)| FunctionParameter { name, type_hint });

    parameter
        .separated_by(comma())
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just('(').then(ws()), ws().then(just(')')))
        .labelled("parameters")
}

/// `: Type` after the parameter list.
fn return_type<'src>(
) -> impl Parser<'src, &'src str, Option<crate::ast::VariableType>, Extra<'src>> + Clone {
    hws()
        .then(just(':'))
        .then(hws())
        .ignore_then(variable_type())
        .or_not()
}

/// Split a leading `"""..."""` line off a function body.
fn take_docstring(mut body: Vec<Node>) -> (Vec<Node>, Option<String>) {
    let docstring = match body.first() {
        Some(Node::MultiLineString { segments }) => {
            let mut text = String::new();
            let mut plain = true;
            for segment in segments {
                match segment {
                    PromptSegment::Text { value } => text.push_str(value),
                    PromptSegment::Interpolation { .. } => plain = false,
                }
            }
            plain.then_some(text)
        }
        _ => None,
    };
    if docstring.is_some() {
        body.remove(0);
    }
    (body, docstring)
}

/// `[async|sync] def name(params): Type { body }`
pub(crate) fn function_definition<'src>(
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    let async_flag = choice((kw("async").to(true), kw("sync").to(false)))
        .then_ignore(hws1())
        .or_not();

    async_flag
        .then_ignore(kw("def"))
        .then_ignore(hws1())
        .then(ident())
        .then_ignore(hws())
        .then(parameters())
        .then(return_type())
        .then_ignore(hws())
        .then(block(stmt))
        .map(|((((is_async, function_name), parameters), return_type), body)| {
            let (body, docstring) = take_docstring(body);
            Node::Function(FunctionDefinition {
                function_name,
                parameters,
                return_type,
                body,
                is_async,
                docstring,
            })
        })
        .labelled("function definition")
}

/// `node name(params): Type { body }`
pub(crate) fn graph_node_definition<'src>(
    stmt: impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src,
) -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone + 'src {
    kw("node")
        .then(hws1())
        .ignore_then(ident())
        .then_ignore(hws())
        .then(parameters())
        .then(return_type())
        .then_ignore(hws())
        .then(block(stmt))
        .map(|(((node_name, parameters), return_type), body)| {
            Node::GraphNode(GraphNodeDefinition {
                node_name,
                parameters,
                return_type,
                body,
            })
        })
        .labelled("graph node definition")
}

//! Expression parsers.
//!
//! Expressions are built in three layers:
//!
//! 1. **Atoms**: number, string, multi-line string, boolean, function call,
//!    variable.
//! 2. **Access chains**: an atom followed greedily by `.name(args)`, `.name`
//!    and `[expr]`, folded left so `foo.bar().baz[0]` nests outward.
//! 3. **Binary operations**: `chain <op> chain`. There is no precedence
//!    climbing; a second operator is left unconsumed and fails the line.
//!
//! Prompts, arrays, objects and `await` are full expressions but never
//! operands of a binary operator.

use crate::ast::{BinOp, FunctionCall, Node, ObjectEntry};
use chumsky::prelude::*;

use super::literals::{boolean, multi_line_string, number, prompt, string};
use super::primitives::{comma, hws, hws1, ident, kw, name, plain_string, ws, Extra};

/// A postfix access applied to the chain built so far.
#[derive(Debug, Clone)]
enum Access {
    Call(FunctionCall),
    Property(String),
    Index(Node),
}

/// Binary operator symbols, longest first.
fn operator<'src>() -> impl Parser<'src, &'src str, BinOp, Extra<'src>> + Clone {
    choice((
        just("==").to(BinOp::Eq),
        just("!=").to(BinOp::Ne),
        just("<=").to(BinOp::Le),
        just(">=").to(BinOp::Ge),
        just("&&").to(BinOp::And),
        just("||").to(BinOp::Or),
        just('<').to(BinOp::Lt),
        just('>').to(BinOp::Gt),
        just('+').to(BinOp::Add),
        just('-').to(BinOp::Sub),
        just('*').to(BinOp::Mul),
        // `//` and `/*` start comments, never a division
        just('/').then_ignore(one_of("/*").not()).to(BinOp::Div),
        just('%').to(BinOp::Mod),
    ))
    .labelled("operator")
}

/// Parse an expression.
pub fn expression<'src>() -> impl Parser<'src, &'src str, Node, Extra<'src>> + Clone {
    recursive(|expr| {
        let arguments = expr
            .clone()
            .separated_by(comma())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('(').then(ws()), ws().then(just(')')))
            .labelled("arguments");

        let call = ident()
            .then(arguments)
            .map(|(function_name, arguments)| FunctionCall::new(function_name, arguments));

        let atom = choice((
            number(),
            multi_line_string(),
            string(),
            boolean(),
            call.clone().map(Node::FunctionCall),
            name().map(|value| Node::VariableName { value }),
        ));

        let access = choice((
            just('.').ignore_then(call).map(Access::Call),
            just('.').ignore_then(ident()).map(Access::Property),
            expr.clone()
                .delimited_by(just('[').then(ws()), ws().then(just(']')))
                .map(Access::Index),
        ));

        let chain = atom
            .foldl_with(access.repeated(), |object, access, _| match access {
                Access::Call(function_call) => Node::DotFunctionCall {
                    object: Box::new(object),
                    function_call,
                },
                Access::Property(property_name) => Node::DotProperty {
                    object: Box::new(object),
                    property_name,
                },
                Access::Index(index) => Node::IndexAccess {
                    array: Box::new(object),
                    index: Box::new(index),
                },
            })
            .labelled("value")
            .boxed();

        let binary = chain
            .clone()
            .then(
                operator()
                    .padded_by(hws())
                    .then(chain)
                    .or_not(),
            )
            .map(|(left, rest)| match rest {
                Some((operator, right)) => Node::BinOpExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                None => left,
            });

        let array = expr
            .clone()
            .separated_by(comma())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('[').then(ws()), ws().then(just(']')))
            .map(|items| Node::Array { items })
            .labelled("array");

        let entry = choice((ident(), plain_string()))
            .then_ignore(just(':').padded_by(hws()))
            .then(expr.clone())
            .map(|(key, value)| ObjectEntry { key, value });

        let object = entry
            .separated_by(comma())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('{').then(ws()), ws().then(just('}')))
            .map(|entries| Node::Object { entries })
            .labelled("object");

        let await_expr = kw("await")
            .then(hws1())
            .ignore_then(expr)
            .map(|expression| Node::Await {
                expression: Box::new(expression),
            });

        choice((await_expr, prompt(), array, object, binary))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_expr(source: &str) -> Node {
        expression().then_ignore(end()).parse(source).into_result().unwrap()
    }

    #[test]
    fn test_access_chain_is_left_associative() {
        let node = parse_expr("foo.bar().baz[0].qux");
        let expected = Node::DotProperty {
            object: Box::new(Node::IndexAccess {
                array: Box::new(Node::DotProperty {
                    object: Box::new(Node::DotFunctionCall {
                        object: Box::new(Node::variable("foo")),
                        function_call: FunctionCall::new("bar", vec![]),
                    }),
                    property_name: "baz".to_string(),
                }),
                index: Box::new(Node::number("0")),
            }),
            property_name: "qux".to_string(),
        };
        assert_eq!(node, expected);
    }

    #[test]
    fn test_index_access() {
        assert_eq!(
            parse_expr("arr[0]"),
            Node::IndexAccess {
                array: Box::new(Node::variable("arr")),
                index: Box::new(Node::number("0")),
            }
        );
    }

    #[test]
    fn test_empty_index_fails() {
        assert!(expression().then_ignore(end()).parse("arr[]").has_errors());
    }

    #[test]
    fn test_single_binary_operation() {
        assert_eq!(
            parse_expr("a >= 10"),
            Node::BinOpExpression {
                operator: BinOp::Ge,
                left: Box::new(Node::variable("a")),
                right: Box::new(Node::number("10")),
            }
        );
    }

    #[test]
    fn test_operator_chain_is_rejected() {
        assert!(expression().then_ignore(end()).parse("a + b + c").has_errors());
    }

    #[test]
    fn test_call_with_nested_arguments() {
        let node = parse_expr("greet(\"hi\", [1, 2], { name: user.name })");
        let Node::FunctionCall(call) = node else {
            panic!("expected a function call");
        };
        assert_eq!(call.function_name, "greet");
        assert_eq!(call.arguments.len(), 3);
        assert_eq!(call.arguments[1].type_name(), "array");
        assert_eq!(call.arguments[2].type_name(), "object");
    }

    #[test]
    fn test_await_wraps_call() {
        let node = parse_expr("await fetch(url)");
        assert_eq!(node.type_name(), "await");
    }

    #[test]
    fn test_object_with_quoted_key() {
        let node = parse_expr("{ \"first name\": \"Ada\", age: 36 }");
        let Node::Object { entries } = node else {
            panic!("expected an object");
        };
        assert_eq!(entries[0].key, "first name");
        assert_eq!(entries[1].key, "age");
    }

    #[test]
    fn test_multi_line_array() {
        let node = parse_expr("[\n  1,\n  2,\n]");
        assert_eq!(
            node,
            Node::Array {
                items: vec![Node::number("1"), Node::number("2")]
            }
        );
    }
}

//! Type annotation parser.
//!
//! ```text
//! number            string[]          string[][]
//! "a" | "b"         1 | 2             true
//! { x: number; y: number }            (number | string)[]
//! Coords            (alias reference)
//! ```

use crate::ast::{ObjectProperty, VariableType};
use chumsky::prelude::*;

use super::primitives::{hws, ident, kw, number_text, plain_string, ws, Extra};

/// Parse a type annotation.
pub(crate) fn variable_type<'src>(
) -> impl Parser<'src, &'src str, VariableType, Extra<'src>> + Clone {
    recursive(|ty| {
        let property_sep = hws()
            .then(choice((one_of(",;").ignored(), just('\n').ignored())))
            .then(ws());

        let property = ident()
            .then_ignore(just(':').padded_by(hws()))
            .then(ty.clone())
            .map(|(key, value)| ObjectProperty { key, value });

        let object = property
            .separated_by(property_sep)
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('{').then(ws()), ws().then(just('}')))
            .map(|properties| VariableType::Object { properties })
            .labelled("object type");

        let parenthesized = ty
            .clone()
            .delimited_by(just('(').then(ws()), ws().then(just(')')));

        let literal = choice((
            plain_string().map(|value| VariableType::StringLiteral { value }),
            number_text().map(|value| VariableType::NumberLiteral { value }),
            kw("true").to(VariableType::BooleanLiteral { value: true }),
            kw("false").to(VariableType::BooleanLiteral { value: false }),
        ));

        let named = ident().map(|name| VariableType::from_name(&name));

        let primary = choice((object, parenthesized, literal, named));

        let array = primary.foldl_with(just("[]").repeated(), |element, _, _| {
            VariableType::array(element)
        });

        array
            .separated_by(just('|').padded_by(hws()))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|mut types| {
                if types.len() == 1 {
                    types.remove(0)
                } else {
                    VariableType::Union { types }
                }
            })
            .labelled("type")
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_type(source: &str) -> VariableType {
        variable_type().then_ignore(end()).parse(source).into_result().unwrap()
    }

    #[test]
    fn test_nested_arrays() {
        assert_eq!(
            parse_type("number[][]"),
            VariableType::array(VariableType::array(VariableType::primitive("number")))
        );
    }

    #[test]
    fn test_union_of_literals() {
        assert_eq!(
            parse_type("\"a\" | \"b\" | 3"),
            VariableType::union(vec![
                VariableType::StringLiteral {
                    value: "a".to_string()
                },
                VariableType::StringLiteral {
                    value: "b".to_string()
                },
                VariableType::NumberLiteral {
                    value: "3".to_string()
                },
            ])
        );
    }

    #[test]
    fn test_object_with_mixed_separators() {
        assert_eq!(
            parse_type("{ x: number, y: number; label: string }"),
            VariableType::object([
                ("x", VariableType::primitive("number")),
                ("y", VariableType::primitive("number")),
                ("label", VariableType::primitive("string")),
            ])
        );
    }

    #[test]
    fn test_multi_line_object() {
        assert_eq!(
            parse_type("{\n  x: number\n  y: string[]\n}"),
            VariableType::object([
                ("x", VariableType::primitive("number")),
                ("y", VariableType::array(VariableType::primitive("string"))),
            ])
        );
    }

    #[test]
    fn test_parenthesized_union_array() {
        assert_eq!(
            parse_type("(number | string)[]"),
            VariableType::array(VariableType::union(vec![
                VariableType::primitive("number"),
                VariableType::primitive("string"),
            ]))
        );
    }

    #[test]
    fn test_alias_reference() {
        assert_eq!(parse_type("Coords"), VariableType::alias("Coords"));
    }
}

//! The structural assignability relation.
//!
//! `is_assignable(source, target)` answers "can a value of type `source` be
//! stored where `target` is expected". Rules, in order:
//!
//! | Case | Result |
//! |------|--------|
//! | either side `any` | yes |
//! | either side an unresolved alias | no |
//! | identical types | yes |
//! | source union | every member assignable to target |
//! | target union | source assignable to some member |
//! | literal to its primitive (`"a"` to `string`) | yes |
//! | primitive to primitive | equal names |
//! | literal to literal | same kind, equal value |
//! | array to array | element types, covariant |
//! | object to object | every target key present in source and assignable |
//! | anything else | no |
//!
//! Aliases are resolved through chains before each comparison. A pair of
//! types that is already being compared further up the recursion counts as
//! assignable, so recursive aliases terminate.

use crate::aliases::TypeAliases;
use agency_parser::VariableType;

/// Whether a value of type `source` may be used where `target` is expected.
pub fn is_assignable(source: &VariableType, target: &VariableType, aliases: &TypeAliases) -> bool {
    Comparison { aliases, in_progress: Vec::new() }.assignable(source, target)
}

/// Alias-expanding comparisons still open on the current recursion path.
struct Comparison<'a> {
    aliases: &'a TypeAliases,
    in_progress: Vec<(&'a VariableType, &'a VariableType)>,
}

impl<'a> Comparison<'a> {
    fn assignable(&mut self, source: &'a VariableType, target: &'a VariableType) -> bool {
        let expands = is_alias(source) || is_alias(target);
        if expands {
            if self.in_progress.iter().any(|&(s, t)| s == source && t == target) {
                return true;
            }
            self.in_progress.push((source, target));
        }
        let result = self.compare(source, target);
        if expands {
            self.in_progress.pop();
        }
        result
    }

    fn compare(&mut self, source: &'a VariableType, target: &'a VariableType) -> bool {
        let aliases = self.aliases;
        let source = aliases.resolve(source);
        let target = aliases.resolve(target);

        if source.is_any() || target.is_any() {
            return true;
        }
        if aliases.is_unresolved(source) || aliases.is_unresolved(target) {
            return false;
        }
        if source == target {
            return true;
        }

        match (source, target) {
            (VariableType::Union { types }, _) => {
                types.iter().all(|member| self.assignable(member, target))
            }
            (_, VariableType::Union { types }) => {
                types.iter().any(|member| self.assignable(source, member))
            }

            (VariableType::StringLiteral { .. }, VariableType::Primitive { value }) => {
                value == "string"
            }
            (VariableType::NumberLiteral { .. }, VariableType::Primitive { value }) => {
                value == "number"
            }
            (VariableType::BooleanLiteral { .. }, VariableType::Primitive { value }) => {
                value == "boolean"
            }

            (VariableType::Primitive { value: a }, VariableType::Primitive { value: b }) => a == b,
            (VariableType::StringLiteral { value: a }, VariableType::StringLiteral { value: b }) => {
                a == b
            }
            (VariableType::NumberLiteral { value: a }, VariableType::NumberLiteral { value: b }) => {
                number_literals_equal(a, b)
            }
            (VariableType::BooleanLiteral { value: a }, VariableType::BooleanLiteral { value: b }) => {
                a == b
            }

            (
                VariableType::Array { element_type: a },
                VariableType::Array { element_type: b },
            ) => self.assignable(a, b),

            (
                VariableType::Object { properties: source_props },
                VariableType::Object { properties: target_props },
            ) => target_props.iter().all(|required| {
                source_props
                    .iter()
                    .find(|p| p.key == required.key)
                    .is_some_and(|p| self.assignable(&p.value, &required.value))
            }),

            _ => false,
        }
    }
}

fn is_alias(ty: &VariableType) -> bool {
    matches!(ty, VariableType::TypeAliasVariable { .. })
}

/// `1` and `1.0` name the same literal type.
fn number_literals_equal(a: &str, b: &str) -> bool {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x == y,
        _ => a == b,
    }
}

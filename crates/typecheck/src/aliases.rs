//! Type alias table.

use agency_parser::walk::walk_nodes;
use agency_parser::{Node, VariableType};
use indexmap::IndexMap;

/// `type Name = T` declarations by name, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeAliases {
    aliases: IndexMap<String, VariableType>,
}

impl TypeAliases {
    /// Collect every alias in the program, at any depth. The first
    /// declaration of a name wins.
    pub fn collect(nodes: &[Node]) -> Self {
        let mut aliases = IndexMap::new();
        walk_nodes(nodes, &mut |node, _| {
            if let Node::TypeAlias {
                alias_name,
                aliased_type,
            } = node
            {
                aliases
                    .entry(alias_name.clone())
                    .or_insert_with(|| aliased_type.clone());
            }
        });
        Self { aliases }
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: VariableType) {
        self.aliases.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&VariableType> {
        self.aliases.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableType)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Follow alias references until a non-alias type is reached.
    ///
    /// An unknown name, or a chain that loops back on itself, yields the
    /// last alias reference seen.
    pub fn resolve<'a>(&'a self, ty: &'a VariableType) -> &'a VariableType {
        let mut current = ty;
        for _ in 0..=self.aliases.len() {
            match current {
                VariableType::TypeAliasVariable { alias_name } => match self.aliases.get(alias_name) {
                    Some(next) => current = next,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Whether `ty` is an alias reference that does not resolve.
    pub fn is_unresolved(&self, ty: &VariableType) -> bool {
        matches!(self.resolve(ty), VariableType::TypeAliasVariable { .. })
    }

    /// Alias names referenced anywhere inside `ty` that are not declared,
    /// one entry per reference.
    pub fn undefined_references(&self, ty: &VariableType) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_undefined(ty, &mut missing);
        missing
    }

    fn collect_undefined(&self, ty: &VariableType, missing: &mut Vec<String>) {
        match ty {
            VariableType::TypeAliasVariable { alias_name } => {
                if !self.contains(alias_name) {
                    missing.push(alias_name.clone());
                }
            }
            VariableType::Array { element_type } => self.collect_undefined(element_type, missing),
            VariableType::Union { types } => {
                for member in types {
                    self.collect_undefined(member, missing);
                }
            }
            VariableType::Object { properties } => {
                for property in properties {
                    self.collect_undefined(&property.value, missing);
                }
            }
            VariableType::Primitive { .. }
            | VariableType::StringLiteral { .. }
            | VariableType::NumberLiteral { .. }
            | VariableType::BooleanLiteral { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolves_chains() {
        let program =
            agency_parser::parse("type A = B\ntype B = C\ntype C = number[]\n").unwrap();
        let aliases = TypeAliases::collect(&program.nodes);
        assert_eq!(
            aliases.resolve(&VariableType::alias("A")),
            &VariableType::array(VariableType::primitive("number"))
        );
    }

    #[test]
    fn test_cycles_and_unknown_names_stay_unresolved() {
        let program = agency_parser::parse("type A = B\ntype B = A\n").unwrap();
        let aliases = TypeAliases::collect(&program.nodes);
        assert!(aliases.is_unresolved(&VariableType::alias("A")));
        assert!(aliases.is_unresolved(&VariableType::alias("Missing")));
        assert!(!aliases.is_unresolved(&VariableType::primitive("string")));
    }

    #[test]
    fn test_undefined_references_are_listed_per_use() {
        let aliases = TypeAliases::default();
        let ty = agency_parser::parse_type("{ a: Point; b: Point[] | Size }").unwrap();
        assert_eq!(aliases.undefined_references(&ty), vec!["Point", "Point", "Size"]);
    }
}

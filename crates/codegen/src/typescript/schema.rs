//! JSON schemas and TypeScript type text for Agency types.
//!
//! Schemas describe tool parameters and structured prompt responses. Aliases
//! are inlined; a self-referencing alias collapses to the empty schema `{}`
//! at the point it recurses.

use agency_parser::{ObjectProperty, VariableType};
use agency_typecheck::TypeAliases;
use serde_json::{json, Map, Value};

/// JSON schema for `ty`.
pub fn json_schema(ty: &VariableType, aliases: &TypeAliases) -> Value {
    schema_with_guard(ty, aliases, &mut Vec::new())
}

fn schema_with_guard(ty: &VariableType, aliases: &TypeAliases, visiting: &mut Vec<String>) -> Value {
    match ty {
        VariableType::Primitive { value } => primitive_schema(value),
        VariableType::StringLiteral { value } => json!({ "type": "string", "enum": [value] }),
        VariableType::NumberLiteral { value } => json!({ "type": "number", "enum": [number_value(value)] }),
        VariableType::BooleanLiteral { value } => json!({ "type": "boolean", "enum": [value] }),
        VariableType::Array { element_type } => json!({
            "type": "array",
            "items": schema_with_guard(element_type, aliases, visiting),
        }),
        VariableType::Union { types } => {
            let literals: Option<Vec<&str>> = types
                .iter()
                .map(|t| match aliases.resolve(t) {
                    VariableType::StringLiteral { value } => Some(value.as_str()),
                    _ => None,
                })
                .collect();
            match literals {
                Some(values) if !values.is_empty() => json!({ "type": "string", "enum": values }),
                _ => json!({
                    "anyOf": types
                        .iter()
                        .map(|t| schema_with_guard(t, aliases, visiting))
                        .collect::<Vec<_>>(),
                }),
            }
        }
        VariableType::Object { properties } => object_schema(properties, aliases, visiting),
        VariableType::TypeAliasVariable { alias_name } => {
            if visiting.iter().any(|name| name == alias_name) {
                return json!({});
            }
            let Some(target) = aliases.get(alias_name) else {
                return json!({});
            };
            visiting.push(alias_name.clone());
            let schema = schema_with_guard(target, aliases, visiting);
            visiting.pop();
            schema
        }
    }
}

fn primitive_schema(name: &str) -> Value {
    match name {
        "number" | "string" | "boolean" | "null" => json!({ "type": name }),
        "object" => json!({ "type": "object" }),
        _ => json!({}),
    }
}

fn object_schema(properties: &[ObjectProperty], aliases: &TypeAliases, visiting: &mut Vec<String>) -> Value {
    let mut props = Map::new();
    for property in properties {
        props.insert(
            property.key.clone(),
            schema_with_guard(&property.value, aliases, visiting),
        );
    }
    let required: Vec<&str> = properties.iter().map(|p| p.key.as_str()).collect();
    json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
    })
}

fn number_value(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return json!(int);
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Schema for a tool's arguments: one required property per parameter,
/// untyped parameters accept anything.
pub fn parameters_schema(
    parameters: &[agency_parser::FunctionParameter],
    aliases: &TypeAliases,
) -> Value {
    let properties: Vec<ObjectProperty> = parameters
        .iter()
        .map(|p| ObjectProperty {
            key: p.name.clone(),
            value: p.type_hint.clone().unwrap_or_else(VariableType::any),
        })
        .collect();
    object_schema(&properties, aliases, &mut Vec::new())
}

/// `responseFormat` for a prompt whose result is assigned to a `ty` variable.
///
/// The type is wrapped as `{ value: T }` so scalar and array results still
/// arrive as a JSON object.
pub fn response_format(ty: &VariableType, aliases: &TypeAliases) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "response",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": { "value": json_schema(ty, aliases) },
                "required": ["value"],
                "additionalProperties": false,
            },
        },
    })
}

/// TypeScript spelling of an Agency type.
pub fn ts_type(ty: &VariableType) -> String {
    match ty {
        VariableType::Primitive { value } => match value.as_str() {
            "object" => "Record<string, any>".to_string(),
            other => other.to_string(),
        },
        VariableType::StringLiteral { value } => quote(value),
        VariableType::NumberLiteral { value } => value.clone(),
        VariableType::BooleanLiteral { value } => value.to_string(),
        VariableType::Array { element_type } => match element_type.as_ref() {
            VariableType::Union { .. } => format!("({})[]", ts_type(element_type)),
            other => format!("{}[]", ts_type(other)),
        },
        VariableType::Union { types } => types.iter().map(ts_type).collect::<Vec<_>>().join(" | "),
        VariableType::Object { properties } if properties.is_empty() => "{}".to_string(),
        VariableType::Object { properties } => {
            let fields: Vec<String> = properties
                .iter()
                .map(|p| format!("{}: {}", property_key(&p.key), ts_type(&p.value)))
                .collect();
            format!("{{ {} }}", fields.join("; "))
        }
        VariableType::TypeAliasVariable { alias_name } => alias_name.clone(),
    }
}

/// A TypeScript string literal.
pub fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// An object key, quoted unless it is a plain identifier.
pub fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_ident = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_parser::parse_type;
    use pretty_assertions::assert_eq;

    fn ty(source: &str) -> VariableType {
        parse_type(source).unwrap()
    }

    #[test]
    fn test_object_schema_requires_every_key() {
        let schema = json_schema(&ty("{ x: number; tags: string[] }"), &TypeAliases::default());
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "x": { "type": "number" },
                    "tags": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["x", "tags"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_string_literal_union_becomes_enum() {
        let schema = json_schema(&ty("\"low\" | \"high\""), &TypeAliases::default());
        assert_eq!(schema, json!({ "type": "string", "enum": ["low", "high"] }));
    }

    #[test]
    fn test_mixed_union_becomes_any_of() {
        let schema = json_schema(&ty("number | null"), &TypeAliases::default());
        assert_eq!(
            schema,
            json!({ "anyOf": [{ "type": "number" }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_aliases_are_inlined() {
        let mut aliases = TypeAliases::default();
        aliases.insert("Coords", ty("{ x: number; y: number }"));
        let schema = json_schema(&ty("Coords[]"), &aliases);
        assert_eq!(schema["items"]["required"], json!(["x", "y"]));
    }

    #[test]
    fn test_recursive_alias_terminates() {
        let mut aliases = TypeAliases::default();
        aliases.insert("Tree", ty("{ value: number; children: Tree[] }"));
        let schema = json_schema(&ty("Tree"), &aliases);
        assert_eq!(
            schema["properties"]["children"],
            json!({ "type": "array", "items": {} })
        );
    }

    #[test]
    fn test_response_format_wraps_value() {
        let format = response_format(&ty("number"), &TypeAliases::default());
        assert_eq!(
            format["json_schema"]["schema"]["properties"]["value"],
            json!({ "type": "number" })
        );
        assert_eq!(format["json_schema"]["strict"], json!(true));
    }

    #[test]
    fn test_ts_type() {
        assert_eq!(ts_type(&ty("(string | number)[]")), "(string | number)[]");
        assert_eq!(ts_type(&ty("{ x: number; y: Coords }")), "{ x: number; y: Coords }");
        assert_eq!(ts_type(&ty("\"a\" | 1")), "\"a\" | 1");
    }

    #[test]
    fn test_property_key() {
        assert_eq!(property_key("name"), "name");
        assert_eq!(property_key("first name"), "\"first name\"");
    }
}

//! Expression type inference.
//!
//! Inference is shallow and never fails: anything it cannot determine is
//! `any`, which the assignability relation accepts everywhere.

use crate::aliases::TypeAliases;
use crate::scope::{Scope, Signatures};
use agency_parser::{BinOp, Node, ObjectProperty, PromptSegment, VariableType};

/// What inference can see from an expression's position.
#[derive(Debug, Clone, Copy)]
pub struct InferContext<'a> {
    pub aliases: &'a TypeAliases,
    pub signatures: &'a Signatures,
    pub scope: &'a Scope,
}

/// Infer the type of an expression.
///
/// Scalar literals keep their literal type (`"ok"`, `5`, `true`) so they
/// check against literal unions. Members of array and object literals are
/// widened to their primitives.
pub fn infer(node: &Node, ctx: &InferContext<'_>) -> VariableType {
    match node {
        Node::Number { value } => VariableType::NumberLiteral {
            value: value.clone(),
        },
        Node::String { segments } => match plain_text(segments) {
            Some(value) => VariableType::StringLiteral { value },
            None => VariableType::primitive("string"),
        },
        Node::MultiLineString { .. } => VariableType::primitive("string"),
        Node::Boolean { value } => VariableType::BooleanLiteral { value: *value },
        Node::VariableName { value } => ctx
            .scope
            .get(value)
            .cloned()
            .unwrap_or_else(VariableType::any),

        // Prompt results are shaped by the annotation they are assigned to
        Node::Prompt(_) => VariableType::any(),

        Node::FunctionCall(call) => ctx
            .signatures
            .get(&call.function_name)
            .filter(|sig| !sig.is_graph_node)
            .and_then(|sig| sig.return_type.clone())
            .unwrap_or_else(VariableType::any),

        Node::DotProperty {
            object,
            property_name,
        } => {
            let object_type = infer(object, ctx);
            match ctx.aliases.resolve(&object_type) {
                VariableType::Object { properties } => properties
                    .iter()
                    .find(|p| &p.key == property_name)
                    .map(|p| p.value.clone())
                    .unwrap_or_else(VariableType::any),
                _ => VariableType::any(),
            }
        }

        Node::IndexAccess { array, .. } => {
            let array_type = infer(array, ctx);
            match ctx.aliases.resolve(&array_type) {
                VariableType::Array { element_type } => element_type.as_ref().clone(),
                _ => VariableType::any(),
            }
        }

        Node::BinOpExpression {
            operator,
            left,
            right,
        } => infer_binop(*operator, left, right, ctx),

        Node::Array { items } => {
            let mut members: Vec<VariableType> = Vec::new();
            for item in items {
                let ty = widen(infer(item, ctx));
                if !members.contains(&ty) {
                    members.push(ty);
                }
            }
            let element = match members.len() {
                0 => VariableType::any(),
                1 => members.remove(0),
                _ => VariableType::union(members),
            };
            VariableType::array(element)
        }

        Node::Object { entries } => VariableType::Object {
            properties: entries
                .iter()
                .map(|entry| ObjectProperty {
                    key: entry.key.clone(),
                    value: widen(infer(&entry.value, ctx)),
                })
                .collect(),
        },

        Node::Await { expression } => infer(expression, ctx),

        _ => VariableType::any(),
    }
}

fn infer_binop(operator: BinOp, left: &Node, right: &Node, ctx: &InferContext<'_>) -> VariableType {
    if operator.is_comparison() || operator.is_logical() {
        return VariableType::primitive("boolean");
    }
    if operator == BinOp::Add {
        let is_string = |node: &Node| {
            let ty = infer(node, ctx);
            match ctx.aliases.resolve(&ty) {
                VariableType::StringLiteral { .. } => true,
                VariableType::Primitive { value } => value == "string",
                _ => false,
            }
        };
        if is_string(left) || is_string(right) {
            return VariableType::primitive("string");
        }
    }
    VariableType::primitive("number")
}

/// Replace literal types by their primitives, recursively.
pub fn widen(ty: VariableType) -> VariableType {
    match ty {
        VariableType::StringLiteral { .. } => VariableType::primitive("string"),
        VariableType::NumberLiteral { .. } => VariableType::primitive("number"),
        VariableType::BooleanLiteral { .. } => VariableType::primitive("boolean"),
        VariableType::Array { element_type } => VariableType::array(widen(*element_type)),
        VariableType::Union { types } => {
            let mut members: Vec<VariableType> = Vec::new();
            for member in types.into_iter().map(widen) {
                if !members.contains(&member) {
                    members.push(member);
                }
            }
            if members.len() == 1 {
                members.remove(0)
            } else {
                VariableType::union(members)
            }
        }
        VariableType::Object { properties } => VariableType::Object {
            properties: properties
                .into_iter()
                .map(|p| ObjectProperty {
                    key: p.key,
                    value: widen(p.value),
                })
                .collect(),
        },
        other => other,
    }
}

fn plain_text(segments: &[PromptSegment]) -> Option<String> {
    let mut text = String::new();
    for segment in segments {
        match segment {
            PromptSegment::Text { value } => text.push_str(value),
            PromptSegment::Interpolation { .. } => return None,
        }
    }
    Some(text)
}

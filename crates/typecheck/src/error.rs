//! Type-check diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One type-check diagnostic.
///
/// Diagnostics are data: the checker collects every one it finds and never
/// stops early. The optional fields let tooling point at the variable and
/// show both types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct TypeCheckError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_type: Option<String>,
}

impl TypeCheckError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            variable_name: None,
            expected_type: None,
            actual_type: None,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    pub fn with_types(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected_type = Some(expected.into());
        self.actual_type = Some(actual.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let err = TypeCheckError::new("Type mismatch")
            .with_variable("x")
            .with_types("number", "string");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "message": "Type mismatch",
                "variableName": "x",
                "expectedType": "number",
                "actualType": "string"
            })
        );
        let bare = serde_json::to_value(TypeCheckError::new("oops")).unwrap();
        assert_eq!(bare, serde_json::json!({ "message": "oops" }));
    }
}

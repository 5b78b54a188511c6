//! Compiler configuration.
//!
//! `agencyc --config agency.json` reads this from JSON:
//!
//! ```json
//! {
//!   "strictTypes": true,
//!   "excludeBuiltinFunctions": ["fetch"],
//!   "allowedFetchDomains": ["api.example.com"]
//! }
//! ```

use agency_codegen::CodegenOptions;
use agency_graph::PreprocessOptions;
use agency_typecheck::TypeCheckOptions;
use serde::{Deserialize, Serialize};

/// Settings for one compilation. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgencyConfig {
    /// Unannotated variables are errors, and type errors fail the compile.
    pub strict_types: bool,
    /// Statement `type` tags removed before compiling.
    pub exclude_node_types: Vec<String>,
    /// Built-in functions the generated code may not use.
    pub exclude_builtin_functions: Vec<String>,
    pub allowed_fetch_domains: Vec<String>,
    pub disallowed_fetch_domains: Vec<String>,
    /// Runtime module imported by generated code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_module: Option<String>,
}

impl AgencyConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            exclude_node_types: self.exclude_node_types.clone(),
            allowed_fetch_domains: self.allowed_fetch_domains.clone(),
            disallowed_fetch_domains: self.disallowed_fetch_domains.clone(),
        }
    }

    pub fn typecheck_options(&self) -> TypeCheckOptions {
        TypeCheckOptions {
            strict_types: self.strict_types,
        }
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        let mut options = CodegenOptions {
            excluded_builtins: self.exclude_builtin_functions.clone(),
            ..CodegenOptions::default()
        };
        if let Some(module) = &self.runtime_module {
            options.runtime_module = module.clone();
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_camel_case_keys() {
        let config = AgencyConfig::from_json(
            r#"{"strictTypes": true, "excludeNodeTypes": ["comment"], "disallowedFetchDomains": ["evil.com"]}"#,
        )
        .unwrap();
        assert!(config.strict_types);
        assert_eq!(config.preprocess_options().exclude_node_types, vec!["comment"]);
        assert_eq!(config.preprocess_options().disallowed_fetch_domains, vec!["evil.com"]);
        assert!(config.typecheck_options().strict_types);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AgencyConfig::from_json("{}").unwrap(), AgencyConfig::default());
    }

    #[test]
    fn test_codegen_options() {
        let config = AgencyConfig {
            exclude_builtin_functions: vec!["sleep".to_string()],
            runtime_module: Some("./runtime.js".to_string()),
            ..AgencyConfig::default()
        };
        let options = config.codegen_options();
        assert_eq!(options.excluded_builtins, vec!["sleep"]);
        assert_eq!(options.runtime_module, "./runtime.js");
        assert_eq!(
            AgencyConfig::default().codegen_options().runtime_module,
            agency_codegen::DEFAULT_RUNTIME_MODULE
        );
    }
}

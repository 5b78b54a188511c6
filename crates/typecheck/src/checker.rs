//! The type checker.
//!
//! 1. Collect type aliases and report references to undefined ones, in alias
//!    bodies and in every other annotation.
//! 2. Collect function and graph-node signatures.
//! 3. Build one scope for the top level and one per definition.
//! 4. Check assignments against the pinned type of their variable.
//! 5. Check call arity, then argument types against typed parameters.
//! 6. Check `return` values against the declared return type.
//!
//! Every problem becomes one [`TypeCheckError`]; checking always runs to the
//! end.

use crate::aliases::TypeAliases;
use crate::assignable::is_assignable;
use crate::error::TypeCheckError;
use crate::infer::{infer, InferContext};
use crate::scope::{Scope, Signatures};
use agency_parser::walk::walk_nodes;
use agency_parser::{format_type, FunctionCall, Node, Program, VariableType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Checker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeCheckOptions {
    /// Report variables that are never annotated instead of treating them as `any`.
    pub strict_types: bool,
}

/// All diagnostics of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCheckResult {
    pub errors: Vec<TypeCheckError>,
}

impl TypeCheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a program.
///
/// ```rust
/// use agency_typecheck::{check, TypeCheckOptions};
///
/// let program = agency_parser::parse("x: number = \"five\"\n").unwrap();
/// let result = check(&program, &TypeCheckOptions::default());
/// assert_eq!(result.errors.len(), 1);
/// assert_eq!(result.errors[0].expected_type.as_deref(), Some("number"));
/// ```
pub fn check(program: &Program, options: &TypeCheckOptions) -> TypeCheckResult {
    TypeChecker::new(program, options).check()
}

/// Tables built from a program, ready to check it.
#[derive(Debug)]
pub struct TypeChecker<'p> {
    program: &'p Program,
    aliases: TypeAliases,
    signatures: Signatures,
    scopes: IndexMap<Option<String>, Scope>,
    errors: Vec<TypeCheckError>,
}

impl<'p> TypeChecker<'p> {
    pub fn new(program: &'p Program, options: &TypeCheckOptions) -> Self {
        let aliases = TypeAliases::collect(&program.nodes);
        let signatures = Signatures::collect(&program.nodes);
        let mut errors = Vec::new();

        let mut scopes = IndexMap::new();
        let top = Scope::build(
            None,
            &[],
            None,
            &program.nodes,
            options.strict_types,
            &mut errors,
        );
        scopes.insert(None, top);

        walk_nodes(&program.nodes, &mut |node, _| {
            let (name, parameters, return_type, body) = match node {
                Node::Function(def) => (
                    &def.function_name,
                    &def.parameters,
                    def.return_type.as_ref(),
                    &def.body,
                ),
                Node::GraphNode(def) => (
                    &def.node_name,
                    &def.parameters,
                    def.return_type.as_ref(),
                    &def.body,
                ),
                _ => return,
            };
            let key = Some(name.clone());
            if scopes.contains_key(&key) {
                return;
            }
            let scope = Scope::build(
                key.clone(),
                parameters,
                return_type,
                body,
                options.strict_types,
                &mut errors,
            );
            scopes.insert(key, scope);
        });

        tracing::debug!(
            aliases = aliases.iter().count(),
            definitions = scopes.len() - 1,
            "built type tables"
        );

        Self {
            program,
            aliases,
            signatures,
            scopes,
            errors,
        }
    }

    /// The scope of a definition, or of the top level for `None`.
    pub fn scope(&self, name: Option<&str>) -> Option<&Scope> {
        self.scopes.get(&name.map(str::to_string))
    }

    pub fn aliases(&self) -> &TypeAliases {
        &self.aliases
    }

    pub fn signatures(&self) -> &Signatures {
        &self.signatures
    }

    /// Run every check and return the collected diagnostics.
    pub fn check(mut self) -> TypeCheckResult {
        let mut errors = std::mem::take(&mut self.errors);
        self.check_alias_references(&mut errors);
        self.check_statements(&mut errors);
        tracing::debug!(errors = errors.len(), "type check complete");
        TypeCheckResult { errors }
    }

    fn check_alias_references(&self, errors: &mut Vec<TypeCheckError>) {
        for (name, ty) in self.aliases.iter() {
            for missing in self.aliases.undefined_references(ty) {
                errors.push(TypeCheckError::new(format!(
                    "Type alias '{}' references undefined type '{}'",
                    name, missing
                )));
            }
        }

        let annotation = |owner: &str, ty: &VariableType, errors: &mut Vec<TypeCheckError>| {
            for missing in self.aliases.undefined_references(ty) {
                errors.push(
                    TypeCheckError::new(format!(
                        "Undefined type '{}' in annotation of '{}'",
                        missing, owner
                    ))
                    .with_variable(owner),
                );
            }
        };

        walk_nodes(&self.program.nodes, &mut |node, _| match node {
            Node::TypeHint {
                variable_name,
                variable_type,
            } => annotation(variable_name, variable_type, errors),
            Node::Assignment {
                variable_name,
                type_hint: Some(ty),
                ..
            } => annotation(variable_name, ty, errors),
            Node::Function(def) => {
                for param in &def.parameters {
                    if let Some(ty) = &param.type_hint {
                        annotation(&param.name, ty, errors);
                    }
                }
                if let Some(ty) = &def.return_type {
                    annotation(&def.function_name, ty, errors);
                }
            }
            Node::GraphNode(def) => {
                for param in &def.parameters {
                    if let Some(ty) = &param.type_hint {
                        annotation(&param.name, ty, errors);
                    }
                }
                if let Some(ty) = &def.return_type {
                    annotation(&def.node_name, ty, errors);
                }
            }
            _ => {}
        });
    }

    fn check_statements(&self, errors: &mut Vec<TypeCheckError>) {
        walk_nodes(&self.program.nodes, &mut |node, ctx| {
            let Some(scope) = self.scopes.get(&ctx.scope) else {
                return;
            };
            let infer_ctx = InferContext {
                aliases: &self.aliases,
                signatures: &self.signatures,
                scope,
            };
            match node {
                Node::Assignment {
                    variable_name,
                    type_hint,
                    value,
                } => {
                    let Some(target) = type_hint.as_ref().or_else(|| scope.get(variable_name))
                    else {
                        return;
                    };
                    let actual = infer(value, &infer_ctx);
                    if !is_assignable(&actual, target, &self.aliases) {
                        errors.push(
                            TypeCheckError::new(format!(
                                "Type mismatch for variable '{}': expected {}, got {}",
                                variable_name,
                                format_type(target),
                                format_type(&actual)
                            ))
                            .with_variable(variable_name)
                            .with_types(format_type(target), format_type(&actual)),
                        );
                    }
                }
                Node::FunctionCall(call) => self.check_call(call, &infer_ctx, errors),
                Node::Return { value: Some(value) } => {
                    let Some(expected) = scope.return_type() else {
                        return;
                    };
                    let actual = infer(value, &infer_ctx);
                    if !is_assignable(&actual, expected, &self.aliases) {
                        let owner = scope.name.as_deref().unwrap_or("<top level>");
                        errors.push(
                            TypeCheckError::new(format!(
                                "Return type mismatch in '{}': expected {}, got {}",
                                owner,
                                format_type(expected),
                                format_type(&actual)
                            ))
                            .with_types(format_type(expected), format_type(&actual)),
                        );
                    }
                }
                _ => {}
            }
        });
    }

    fn check_call(
        &self,
        call: &FunctionCall,
        ctx: &InferContext<'_>,
        errors: &mut Vec<TypeCheckError>,
    ) {
        // Built-ins and imported functions have no signature here
        let Some(signature) = self.signatures.get(&call.function_name) else {
            return;
        };

        if call.arguments.len() != signature.parameters.len() {
            errors.push(TypeCheckError::new(format!(
                "Function '{}' expects {} argument(s), got {}",
                call.function_name,
                signature.parameters.len(),
                call.arguments.len()
            )));
            return;
        }

        for (param, argument) in signature.parameters.iter().zip(&call.arguments) {
            let Some(expected) = &param.type_hint else {
                continue;
            };
            let actual = infer(argument, ctx);
            if !is_assignable(&actual, expected, &self.aliases) {
                errors.push(
                    TypeCheckError::new(format!(
                        "Argument '{}' of '{}': expected {}, got {}",
                        param.name,
                        call.function_name,
                        format_type(expected),
                        format_type(&actual)
                    ))
                    .with_variable(&param.name)
                    .with_types(format_type(expected), format_type(&actual)),
                );
            }
        }
    }
}

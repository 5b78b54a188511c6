//! # agency-typecheck
//!
//! Structural, hint-based type checking for Agency programs.
//!
//! The checker never mutates the tree and never fails: it returns every
//! diagnostic it finds as a [`TypeCheckError`]. Types come from annotations
//! (`x: T = ...`, `x :: T`, typed parameters, return types); variables that
//! are never annotated are `any` unless strict mode is on.
//!
//! ```rust
//! use agency_typecheck::{check, TypeCheckOptions};
//!
//! let source = r#"
//! type Coords = { x: number; y: number }
//!
//! def distance(a: Coords, b: Coords): number {
//!   return a.x - b.x
//! }
//!
//! here: Coords = { x: 1, y: 2, label: "home" }
//! d = distance(here, { x: 1 })
//! "#;
//!
//! let program = agency_parser::parse(source).unwrap();
//! let result = check(&program, &TypeCheckOptions::default());
//! assert_eq!(result.errors.len(), 1);
//! assert_eq!(result.errors[0].variable_name.as_deref(), Some("b"));
//! ```

pub mod aliases;
pub mod assignable;
pub mod checker;
pub mod error;
pub mod infer;
pub mod scope;

pub use aliases::TypeAliases;
pub use assignable::is_assignable;
pub use checker::{check, TypeCheckOptions, TypeCheckResult, TypeChecker};
pub use error::TypeCheckError;
pub use infer::{infer, widen, InferContext};
pub use scope::{Scope, Signature, Signatures};

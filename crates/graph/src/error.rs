//! Error types for preprocessing.

use thiserror::Error;

/// Errors raised while preprocessing a program.
///
/// Domain-policy errors are user-facing and fatal for the compilation unit.
/// `Invariant` signals a broken internal contract and should not be reachable
/// from ordinary input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    /// A fetch targets a host on the deny-list.
    #[error("fetch to domain '{domain}' is disallowed (url: {url})")]
    DisallowedDomain { domain: String, url: String },

    /// An allow-list is configured and the fetch host is not on it.
    #[error("fetch to domain '{domain}' is not allowed; allowed domains: {allowed} (url: {url})")]
    DomainNotAllowed {
        domain: String,
        url: String,
        allowed: String,
    },

    /// A domain policy is active and the literal URL has no host to check.
    #[error("cannot check fetch url '{url}' against the domain policy: {reason}")]
    InvalidFetchUrl { url: String, reason: String },

    /// An internal contract was violated.
    #[error("preprocessor invariant violated: {0}")]
    Invariant(String),
}

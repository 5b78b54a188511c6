//! Fetch domain policy.
//!
//! Literal URLs passed to the fetch built-ins are checked against an
//! allow-list and a deny-list. A host must be on the allow-list when one is
//! configured, and must not be on the deny-list. A host on both lists is
//! denied.

use crate::error::PreprocessError;
use agency_parser::walk::walk_nodes;
use agency_parser::{Node, PromptSegment};
use url::Url;

/// Built-ins whose first argument is a URL.
pub const FETCH_BUILTINS: &[&str] = &["fetch", "fetchJSON", "fetchJson", "fetchMarkdown"];

/// Allowed and disallowed fetch hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPolicy {
    pub allowed: Vec<String>,
    pub disallowed: Vec<String>,
}

impl DomainPolicy {
    /// Whether either list is configured.
    pub fn is_active(&self) -> bool {
        !self.allowed.is_empty() || !self.disallowed.is_empty()
    }

    /// Check one URL.
    pub fn check_url(&self, url: &str) -> Result<(), PreprocessError> {
        let parsed = Url::parse(url).map_err(|e| PreprocessError::InvalidFetchUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let Some(host) = parsed.host_str() else {
            return Err(PreprocessError::InvalidFetchUrl {
                url: url.to_string(),
                reason: "url has no host".to_string(),
            });
        };
        let host = host.to_ascii_lowercase();

        if self.disallowed.iter().any(|d| d.eq_ignore_ascii_case(&host)) {
            return Err(PreprocessError::DisallowedDomain {
                domain: host,
                url: url.to_string(),
            });
        }
        if !self.allowed.is_empty() && !self.allowed.iter().any(|d| d.eq_ignore_ascii_case(&host)) {
            return Err(PreprocessError::DomainNotAllowed {
                domain: host,
                url: url.to_string(),
                allowed: self.allowed.join(", "),
            });
        }
        Ok(())
    }
}

/// The URL text of a plain string literal. Interpolated strings are skipped:
/// their host is only known at run time.
fn literal_url(node: &Node) -> Option<String> {
    let Node::String { segments } = node else {
        return None;
    };
    let mut text = String::new();
    for segment in segments {
        match segment {
            PromptSegment::Text { value } => text.push_str(value),
            PromptSegment::Interpolation { .. } => return None,
        }
    }
    Some(text)
}

/// Check every literal fetch URL in the program. Stops at the first violation.
pub fn check_fetch_domains(nodes: &[Node], policy: &DomainPolicy) -> Result<(), PreprocessError> {
    if !policy.is_active() {
        return Ok(());
    }
    let mut violation: Option<PreprocessError> = None;
    let mut checked = 0usize;

    walk_nodes(nodes, &mut |node, _| {
        if violation.is_some() {
            return;
        }
        let Node::FunctionCall(call) = node else {
            return;
        };
        if !FETCH_BUILTINS.contains(&call.function_name.as_str()) {
            return;
        }
        let Some(url) = call.arguments.first().and_then(literal_url) else {
            return;
        };
        checked += 1;
        if let Err(err) = policy.check_url(&url) {
            violation = Some(err);
        }
    });

    tracing::debug!(checked, "checked fetch urls against domain policy");
    match violation {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

//! Statement filtering by node type.

use agency_parser::walk::for_each_body_mut;
use agency_parser::Node;

/// Remove every statement whose `type` tag is in `excluded`, at any depth.
///
/// Only statement positions are filtered; a listed expression type nested
/// inside a kept statement stays where it is.
pub fn exclude_node_types(nodes: &mut Vec<Node>, excluded: &[String]) {
    if excluded.is_empty() {
        return;
    }
    let mut removed = 0usize;
    for_each_body_mut(nodes, &mut |body| {
        let before = body.len();
        body.retain(|node| !excluded.iter().any(|t| t == node.type_name()));
        removed += before - body.len();
    });
    tracing::debug!(removed, ?excluded, "excluded node types");
}

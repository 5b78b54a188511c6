//! Async-taint propagation.
//!
//! Phase A decides each function's `async` flag, callees first: an explicit
//! flag is kept, otherwise a function is async unless it can reach an
//! interrupt. Functions that can interrupt stay synchronous because the
//! generated step machine suspends them structurally.
//!
//! Phase B copies the decision onto call sites and marks prompts. Neither
//! phase overwrites a flag that is already set, so running them again on
//! their own output changes nothing.

use agency_parser::walk::walk_nodes_mut;
use agency_parser::Node;
use std::collections::{BTreeMap, BTreeSet};

/// Phase A: resolve the `async` flag of every function definition.
///
/// `order` lists definitions callees first; names in it that are not
/// functions (graph nodes) are skipped. Returns the resolved flag per
/// function name.
pub fn infer_function_async(
    nodes: &mut [Node],
    order: &[String],
    interrupts: &BTreeSet<String>,
) -> BTreeMap<String, bool> {
    let mut declared: BTreeMap<String, Option<bool>> = BTreeMap::new();
    walk_nodes_mut(nodes, &mut |node, _| {
        if let Node::Function(def) = node {
            declared.entry(def.function_name.clone()).or_insert(def.is_async);
        }
    });

    let mut resolved: BTreeMap<String, bool> = BTreeMap::new();
    for name in order {
        let Some(&explicit) = declared.get(name) else {
            continue;
        };
        let is_async = match explicit {
            Some(flag) => flag,
            None => !interrupts.contains(name),
        };
        tracing::debug!(
            function = %name,
            is_async,
            explicit = explicit.is_some(),
            "resolved async flag"
        );
        resolved.insert(name.clone(), is_async);
    }

    walk_nodes_mut(nodes, &mut |node, _| {
        if let Node::Function(def) = node {
            if def.is_async.is_none() {
                def.is_async = resolved.get(&def.function_name).copied();
            }
        }
    });

    resolved
}

/// Phase B: annotate call sites and prompts. Returns the number of sites marked.
///
/// Calls to user functions take the function's flag; calls to anything else
/// stay unset. A prompt is async unless it streams or offers the model a tool
/// that can interrupt.
pub fn mark_call_sites(
    nodes: &mut [Node],
    async_functions: &BTreeMap<String, bool>,
    interrupts: &BTreeSet<String>,
) -> usize {
    let mut marked = 0usize;
    walk_nodes_mut(nodes, &mut |node, _| match node {
        Node::FunctionCall(call) if call.is_async.is_none() => {
            if let Some(&flag) = async_functions.get(&call.function_name) {
                call.is_async = Some(flag);
                marked += 1;
            }
        }
        Node::Prompt(prompt) if prompt.is_async.is_none() => {
            let interrupting_tool = prompt.tools.iter().any(|t| interrupts.contains(t));
            prompt.is_async = Some(!prompt.is_streaming && !interrupting_tool);
            marked += 1;
        }
        _ => {}
    });
    tracing::trace!(marked, "marked call sites");
    marked
}

//! Preprocessing passes.
//!
//! [`preprocess`] deep-clones the parsed program and runs, in order:
//!
//! 1. node-type exclusion ([`filters`])
//! 2. the fetch domain policy ([`domains`])
//! 3. tool collection ([`tools`])
//! 4. interrupt reachability over the call graph ([`interrupts`])
//! 5. async taint, definitions then call sites ([`async_taint`])
//!
//! The parser's output is never touched, so one parse can feed several
//! compilations with different options.

pub mod async_taint;
pub mod domains;
pub mod filters;
pub mod interrupts;
pub mod tools;

pub use domains::{DomainPolicy, FETCH_BUILTINS};

use crate::error::PreprocessError;
use crate::CallGraph;
use agency_parser::Program;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Options for a preprocessing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreprocessOptions {
    /// Statement `type` tags to remove before any other pass.
    pub exclude_node_types: Vec<String>,
    /// Hosts literal fetch URLs may target. Empty means any host.
    pub allowed_fetch_domains: Vec<String>,
    /// Hosts literal fetch URLs may never target.
    pub disallowed_fetch_domains: Vec<String>,
}

impl PreprocessOptions {
    fn domain_policy(&self) -> DomainPolicy {
        DomainPolicy {
            allowed: self.allowed_fetch_domains.clone(),
            disallowed: self.disallowed_fetch_domains.clone(),
        }
    }
}

/// The annotated program plus the tables computed along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedProgram {
    /// The rewritten clone.
    pub program: Program,
    /// Resolved `async` flag per function name.
    pub async_functions: BTreeMap<String, bool>,
    /// Definitions (functions and graph nodes) that can reach `interrupt`.
    pub interrupt_functions: BTreeSet<String>,
    /// Definition names, callees before callers.
    pub call_order: Vec<String>,
}

impl PreprocessedProgram {
    /// Whether calling `name` can suspend the caller.
    pub fn can_interrupt(&self, name: &str) -> bool {
        self.interrupt_functions.contains(name)
    }

    /// Call graph of the rewritten program.
    pub fn call_graph(&self) -> CallGraph {
        CallGraph::from_program(&self.program)
    }
}

/// Run every pass on a clone of `program`.
///
/// Flags that are already set are left alone, so preprocessing the output a
/// second time reproduces the same annotations.
pub fn preprocess(
    program: &Program,
    options: &PreprocessOptions,
) -> Result<PreprocessedProgram, PreprocessError> {
    let mut program = program.clone();
    tracing::debug!(nodes = program.nodes.len(), "preprocessing program");

    filters::exclude_node_types(&mut program.nodes, &options.exclude_node_types);
    domains::check_fetch_domains(&program.nodes, &options.domain_policy())?;

    let prompts_with_tools = tools::attach_tools(&mut program.nodes);
    tracing::debug!(prompts_with_tools, "collected tool usage");

    let graph = CallGraph::from_program(&program);
    let interrupt_functions = interrupts::interrupt_functions(&graph);
    let call_order = graph.reverse_topological_order();
    if call_order.len() != graph.node_count() {
        return Err(PreprocessError::Invariant(format!(
            "call order covers {} of {} definitions",
            call_order.len(),
            graph.node_count()
        )));
    }

    let async_functions =
        async_taint::infer_function_async(&mut program.nodes, &call_order, &interrupt_functions);
    let marked =
        async_taint::mark_call_sites(&mut program.nodes, &async_functions, &interrupt_functions);
    tracing::debug!(
        functions = async_functions.len(),
        interrupting = interrupt_functions.len(),
        marked,
        "async taint complete"
    );

    Ok(PreprocessedProgram {
        program,
        async_functions,
        interrupt_functions,
        call_order,
    })
}

//! Interrupt reachability.
//!
//! A definition can interrupt when its own body calls `interrupt`, or when it
//! calls (or hands a prompt) a definition that can. Graph-node transitions do
//! not count: the target runs after the caller has returned.

use crate::CallGraph;
use petgraph::algo::tarjan_scc;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

/// Names of every definition that can reach an `interrupt` call.
///
/// Strongly connected components come out of `tarjan_scc` callees first, so
/// each component is decided once from its own direct calls and the cached
/// results of the components it calls. Members of a cycle share one answer.
pub fn interrupt_functions(graph: &CallGraph) -> BTreeSet<String> {
    let inner = graph.inner();
    let mut memo: HashMap<usize, bool> = HashMap::new();

    for scc in tarjan_scc(inner) {
        let direct = scc.iter().any(|&idx| inner[idx].calls_interrupt());
        let inherited = scc.iter().any(|&idx| {
            inner
                .edges(idx)
                .filter(|e| e.weight().runs_in_caller())
                .any(|e| memo.get(&e.target().index()).copied().unwrap_or(false))
        });
        let can_interrupt = direct || inherited;
        for &idx in &scc {
            memo.insert(idx.index(), can_interrupt);
        }
    }

    let names: BTreeSet<String> = inner
        .node_indices()
        .filter(|idx| memo.get(&idx.index()).copied().unwrap_or(false))
        .map(|idx| inner[idx].name().to_string())
        .collect();
    tracing::debug!(?names, "interrupt-capable definitions");
    names
}

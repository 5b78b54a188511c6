//! Query operations on the call graph.

use crate::edges::CallEdge;
use crate::CallGraph;
use petgraph::algo::tarjan_scc;
use petgraph::visit::{DfsPostOrder, EdgeRef};
use petgraph::Direction;

impl CallGraph {
    /// Names of the definitions `name` calls, in edge insertion order.
    ///
    /// Returns an empty list for unknown names.
    pub fn callees(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Names of the definitions that call `name`.
    pub fn callers(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&str> {
        let Some(idx) = self.get_definition(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = Vec::new();
        // petgraph yields the most recent edge first
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        for edge in edges {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            let other = self.graph[other].name();
            if !names.contains(&other) {
                names.push(other);
            }
        }
        names
    }

    /// Find call cycles (mutual or self recursion).
    ///
    /// Each cycle lists its members in source order.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for mut scc in tarjan_scc(&self.graph) {
            let is_cycle = scc.len() > 1
                || scc
                    .first()
                    .is_some_and(|&idx| self.graph.find_edge(idx, idx).is_some());
            if is_cycle {
                scc.sort();
                cycles.push(
                    scc.into_iter()
                        .map(|idx| self.graph[idx].name().to_string())
                        .collect(),
                );
            }
        }

        cycles
    }

    /// Definitions ordered callees before callers.
    ///
    /// Walks a post-order DFS from every definition in source order; nodes
    /// already discovered are skipped, so cycles terminate and every
    /// definition appears exactly once.
    pub fn reverse_topological_order(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut dfs = DfsPostOrder::empty(&self.graph);

        for start in self.graph.node_indices() {
            dfs.move_to(start);
            while let Some(idx) = dfs.next(&self.graph) {
                order.push(self.graph[idx].name().to_string());
            }
        }

        order
    }

    /// Get summary statistics about the graph.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();

        for node in self.graph.node_weights() {
            if node.is_function() {
                stats.functions += 1;
            } else {
                stats.graph_nodes += 1;
            }
            if node.calls_interrupt() {
                stats.direct_interrupts += 1;
            }
        }

        for edge in self.graph.edge_references() {
            match edge.weight() {
                CallEdge::Calls => stats.calls += 1,
                CallEdge::UsesTool => stats.tool_uses += 1,
                CallEdge::GoesTo => stats.transitions += 1,
            }
        }

        stats
    }
}

/// Summary statistics about the graph.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GraphStats {
    pub functions: usize,
    pub graph_nodes: usize,
    pub direct_interrupts: usize,
    pub calls: usize,
    pub tool_uses: usize,
    pub transitions: usize,
}

impl GraphStats {
    /// Total number of definitions.
    pub fn total_definitions(&self) -> usize {
        self.functions + self.graph_nodes
    }

    /// Total number of edges.
    pub fn total_edges(&self) -> usize {
        self.calls + self.tool_uses + self.transitions
    }
}

#[cfg(test)]
mod tests {
    use crate::CallGraph;
    use pretty_assertions::assert_eq;

    fn parse_and_build(source: &str) -> CallGraph {
        let program = agency_parser::parse(source).unwrap();
        CallGraph::from_program(&program)
    }

    #[test]
    fn test_callees_and_callers() {
        let graph = parse_and_build(
            "def a() {\n  b()\n  c()\n}\ndef b() {\n  c()\n}\ndef c() {\n  return 1\n}\n",
        );
        assert_eq!(graph.callees("a"), vec!["b", "c"]);
        assert_eq!(graph.callers("c"), vec!["a", "b"]);
        assert!(graph.callees("missing").is_empty());
    }

    #[test]
    fn test_reverse_topological_order_puts_callees_first() {
        let graph = parse_and_build(
            "def a() {\n  b()\n}\ndef b() {\n  c()\n}\ndef c() {\n  return 1\n}\ndef d() {\n  return 2\n}\n",
        );
        assert_eq!(graph.reverse_topological_order(), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_reverse_topological_order_terminates_on_cycles() {
        let graph = parse_and_build("def a() {\n  b()\n}\ndef b() {\n  a()\n}\n");
        let order = graph.reverse_topological_order();
        assert_eq!(order.len(), 2);
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_find_cycles() {
        let graph = parse_and_build(
            "def a() {\n  b()\n}\ndef b() {\n  a()\n}\ndef loop() {\n  loop()\n}\ndef c() {\n  a()\n}\n",
        );
        let mut cycles = graph.find_cycles();
        cycles.sort();
        assert_eq!(
            cycles,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["loop".to_string()],
            ]
        );
    }

    #[test]
    fn test_no_cycles() {
        let graph = parse_and_build("def a() {\n  b()\n}\ndef b() {\n  return 1\n}\n");
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_stats() {
        let graph = parse_and_build(
            "def ask() {\n  interrupt(\"ok?\")\n}\nnode main() {\n  +ask\n  x = `go`\n  return next(x)\n}\nnode next(x) {\n  ask()\n}\n",
        );
        let stats = graph.stats();
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.graph_nodes, 2);
        assert_eq!(stats.direct_interrupts, 1);
        assert_eq!(stats.total_edges(), 3);
        assert_eq!(stats.transitions, 1);
    }
}

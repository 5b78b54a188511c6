//! Tool-usage collection.
//!
//! `+name` markers are a compile-time annotation: the names they list are
//! buffered per enclosing definition and handed to the next prompt literal in
//! source order, after which the markers are stripped from every body.

use agency_parser::walk::{for_each_body_mut, walk_nodes_mut};
use agency_parser::Node;
use std::collections::HashMap;

/// Attach buffered `+tool` names to prompts and strip the markers.
///
/// Returns the number of prompts that received tools. Names already on a
/// prompt are not duplicated.
pub fn attach_tools(nodes: &mut Vec<Node>) -> usize {
    let mut pending: HashMap<Option<String>, Vec<String>> = HashMap::new();
    let mut attached = 0usize;

    walk_nodes_mut(nodes, &mut |node, ctx| match node {
        Node::UsesTool { tool_names } => {
            let buffer = pending.entry(ctx.scope.clone()).or_default();
            for name in tool_names.iter() {
                if !buffer.contains(name) {
                    buffer.push(name.clone());
                }
            }
        }
        Node::Prompt(prompt) => {
            let Some(buffer) = pending.remove(&ctx.scope) else {
                return;
            };
            for name in buffer {
                if !prompt.tools.contains(&name) {
                    prompt.tools.push(name);
                }
            }
            attached += 1;
        }
        _ => {}
    });

    for (scope, tools) in &pending {
        tracing::debug!(?scope, ?tools, "tool markers with no following prompt");
    }

    for_each_body_mut(nodes, &mut |body| {
        body.retain(|node| !matches!(node, Node::UsesTool { .. }));
    });

    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_parser::walk::find_prompts;
    use pretty_assertions::assert_eq;

    fn prompt_tools(nodes: &[Node]) -> Vec<Vec<String>> {
        find_prompts(nodes).into_iter().map(|p| p.tools.clone()).collect()
    }

    #[test]
    fn test_marker_attaches_to_next_prompt_only() {
        let mut program = agency_parser::parse(
            "node main() {\n  +search, fetchPage\n  a = `first`\n  b = `second`\n}\n",
        )
        .unwrap();
        assert_eq!(attach_tools(&mut program.nodes), 1);
        assert_eq!(
            prompt_tools(&program.nodes),
            vec![
                vec!["search".to_string(), "fetchPage".to_string()],
                vec![],
            ]
        );
    }

    #[test]
    fn test_markers_are_stripped_everywhere() {
        let mut program =
            agency_parser::parse("+a\ndef f() {\n  if (x) {\n    +b\n  }\n}\n").unwrap();
        attach_tools(&mut program.nodes);
        assert_eq!(agency_parser::serialize_with(&program, &agency_parser::FormatOptions::indented()), "def f() {\n  if (x) {}\n}\n");
    }

    #[test]
    fn test_buffers_are_per_definition() {
        let mut program = agency_parser::parse(
            "def f() {\n  +lookup\n}\ndef g() {\n  return `plain`\n}\n",
        )
        .unwrap();
        attach_tools(&mut program.nodes);
        assert_eq!(prompt_tools(&program.nodes), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_markers_accumulate_until_prompt() {
        let mut program =
            agency_parser::parse("node main() {\n  +a\n  +b, a\n  x = `go`\n}\n").unwrap();
        attach_tools(&mut program.nodes);
        assert_eq!(
            prompt_tools(&program.nodes),
            vec![vec!["a".to_string(), "b".to_string()]]
        );
    }
}

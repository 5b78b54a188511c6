//! Mermaid rendering of per-definition call flow.
//!
//! Each function and graph node becomes a subgraph. The calls and prompts of
//! its body are chained in source order; a run of two or more calls marked
//! `async = true` is drawn as a parallel group that fans out from the
//! previous step and back in to the next one. Rendering never changes the
//! tree.

use agency_parser::walk::walk_nodes;
use agency_parser::{FunctionParameter, Node, Program};
use std::fmt::Write;

/// One call or prompt in a body.
#[derive(Debug, Clone, PartialEq)]
struct FlowItem {
    label: String,
    is_async: bool,
}

/// Consecutive items drawn together.
enum FlowStep<'a> {
    Single(&'a FlowItem),
    Parallel(&'a [FlowItem]),
}

/// Render the call flow of every definition as a Mermaid `flowchart TD`.
///
/// Run this on a preprocessed program to see parallel groups; on a raw parse
/// every call site is unmarked and the flow is purely sequential.
pub fn render_call_flow(program: &Program) -> String {
    let mut out = String::from("flowchart TD\n");
    walk_nodes(&program.nodes, &mut |node, _| match node {
        Node::Function(def) => render_definition(
            &mut out,
            &format!("fn_{}", def.function_name),
            &format!("def {}", def.function_name),
            &def.function_name,
            &def.parameters,
            &def.body,
        ),
        Node::GraphNode(def) => render_definition(
            &mut out,
            &format!("node_{}", def.node_name),
            &format!("node {}", def.node_name),
            &def.node_name,
            &def.parameters,
            &def.body,
        ),
        _ => {}
    });
    out
}

fn render_definition(
    out: &mut String,
    prefix: &str,
    title: &str,
    name: &str,
    parameters: &[FunctionParameter],
    body: &[Node],
) {
    let items = flow_items(body);
    let params: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();

    let _ = writeln!(out, "    subgraph {}[\"{}\"]", prefix, escape(title));
    let start = format!("{}_start", prefix);
    let _ = writeln!(
        out,
        "        {}([\"{}({})\"])",
        start,
        escape(name),
        escape(&params.join(", "))
    );

    let mut tails = vec![start];
    let mut counter = 0usize;
    for (group, step) in group_steps(&items).into_iter().enumerate() {
        match step {
            FlowStep::Single(item) => {
                let id = format!("{}_{}", prefix, counter);
                counter += 1;
                let _ = writeln!(out, "        {}[\"{}\"]", id, escape(&item.label));
                for tail in &tails {
                    let _ = writeln!(out, "        {} --> {}", tail, id);
                }
                tails = vec![id];
            }
            FlowStep::Parallel(members) => {
                let _ = writeln!(out, "        subgraph {}_par{}[\"parallel\"]", prefix, group);
                let mut ids = Vec::with_capacity(members.len());
                for item in members {
                    let id = format!("{}_{}", prefix, counter);
                    counter += 1;
                    let _ = writeln!(out, "            {}[\"{}\"]", id, escape(&item.label));
                    ids.push(id);
                }
                let _ = writeln!(out, "        end");
                for tail in &tails {
                    for id in &ids {
                        let _ = writeln!(out, "        {} --> {}", tail, id);
                    }
                }
                tails = ids;
            }
        }
    }
    let _ = writeln!(out, "    end");
}

/// Calls and prompts in a body, in source order. Nested definitions are
/// rendered as their own subgraphs and skipped here.
fn flow_items(body: &[Node]) -> Vec<FlowItem> {
    let mut items = Vec::new();
    for statement in body {
        if matches!(statement, Node::Function(_) | Node::GraphNode(_)) {
            continue;
        }
        walk_nodes(std::slice::from_ref(statement), &mut |node, _| match node {
            Node::FunctionCall(call) => items.push(FlowItem {
                label: format!("{}()", call.function_name),
                is_async: call.is_async == Some(true),
            }),
            Node::Prompt(prompt) => {
                let mut label = if prompt.is_streaming {
                    "stream prompt".to_string()
                } else {
                    "prompt".to_string()
                };
                if !prompt.tools.is_empty() {
                    let _ = write!(label, " +{}", prompt.tools.join(", +"));
                }
                items.push(FlowItem {
                    label,
                    is_async: prompt.is_async == Some(true),
                });
            }
            _ => {}
        });
    }
    items
}

fn group_steps(items: &[FlowItem]) -> Vec<FlowStep<'_>> {
    let mut steps = Vec::new();
    let mut i = 0;
    while i < items.len() {
        if items[i].is_async {
            let run = items[i..].iter().take_while(|item| item.is_async).count();
            if run >= 2 {
                steps.push(FlowStep::Parallel(&items[i..i + run]));
                i += run;
                continue;
            }
        }
        steps.push(FlowStep::Single(&items[i]));
        i += 1;
    }
    steps
}

fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}

//! Tree walking shared by every pass.
//!
//! [`walk_nodes`] and [`walk_nodes_mut`] visit nodes in source order, parents
//! before children, descending into nested bodies and nested expressions
//! alike. The visitor receives a [`WalkContext`] naming the enclosing
//! function or graph node, so passes that build per-definition tables do not
//! need their own recursion.

use crate::ast::{FunctionCall, FunctionDefinition, GraphNodeDefinition, Node, PromptLiteral};

/// Where a visited node sits in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkContext {
    /// Name of the enclosing function or graph node (`None` at top level).
    pub scope: Option<String>,
    /// Nesting depth: 0 for nodes of the list passed to the walker.
    pub depth: usize,
}

impl WalkContext {
    fn enter(&self, node: &Node) -> WalkContext {
        let scope = match node {
            Node::Function(def) => Some(def.function_name.clone()),
            Node::GraphNode(def) => Some(def.node_name.clone()),
            _ => self.scope.clone(),
        };
        WalkContext {
            scope,
            depth: self.depth + 1,
        }
    }
}

/// Visit every node under `nodes`, pre-order.
pub fn walk_nodes<'a, F>(nodes: &'a [Node], visit: &mut F)
where
    F: FnMut(&'a Node, &WalkContext),
{
    let context = WalkContext::default();
    for node in nodes {
        walk_node(node, &context, visit);
    }
}

fn walk_node<'a, F>(node: &'a Node, context: &WalkContext, visit: &mut F)
where
    F: FnMut(&'a Node, &WalkContext),
{
    visit(node, context);
    let inner = context.enter(node);
    for child in node.children() {
        walk_node(child, &inner, visit);
    }
}

/// Visit every node under `nodes`, pre-order, with mutable access.
///
/// Children are visited after the visitor has run on their parent, so a
/// visitor that rewrites a node sees the rewritten children.
pub fn walk_nodes_mut<F>(nodes: &mut [Node], visit: &mut F)
where
    F: FnMut(&mut Node, &WalkContext),
{
    let context = WalkContext::default();
    for node in nodes.iter_mut() {
        walk_node_mut(node, &context, visit);
    }
}

fn walk_node_mut<F>(node: &mut Node, context: &WalkContext, visit: &mut F)
where
    F: FnMut(&mut Node, &WalkContext),
{
    visit(node, context);
    let inner = context.enter(node);
    for child in node.children_mut() {
        walk_node_mut(child, &inner, visit);
    }
}

/// Apply `f` to every statement list in the tree (the top-level list first,
/// then nested bodies, outermost first).
pub fn for_each_body_mut<F>(nodes: &mut Vec<Node>, f: &mut F)
where
    F: FnMut(&mut Vec<Node>),
{
    f(nodes);
    for node in nodes.iter_mut() {
        for body in node.bodies_mut() {
            for_each_body_mut(body, f);
        }
    }
}

/// All function definitions, at any depth.
pub fn function_definitions(nodes: &[Node]) -> Vec<&FunctionDefinition> {
    let mut found = Vec::new();
    walk_nodes(nodes, &mut |node, _| {
        if let Node::Function(def) = node {
            found.push(def);
        }
    });
    found
}

/// All graph-node definitions, at any depth.
pub fn graph_nodes(nodes: &[Node]) -> Vec<&GraphNodeDefinition> {
    let mut found = Vec::new();
    walk_nodes(nodes, &mut |node, _| {
        if let Node::GraphNode(def) = node {
            found.push(def);
        }
    });
    found
}

/// Plain calls `name(...)` under `nodes` (method calls `x.name(...)` excluded).
pub fn find_calls(nodes: &[Node]) -> Vec<&FunctionCall> {
    let mut found = Vec::new();
    walk_nodes(nodes, &mut |node, _| {
        if let Node::FunctionCall(call) = node {
            found.push(call);
        }
    });
    found
}

/// Prompt literals under `nodes`.
pub fn find_prompts(nodes: &[Node]) -> Vec<&PromptLiteral> {
    let mut found = Vec::new();
    walk_nodes(nodes, &mut |node, _| {
        if let Node::Prompt(prompt) = node {
            found.push(prompt);
        }
    });
    found
}

/// Names of the variables read by an expression, in order of first use.
///
/// Includes `${name}` interpolations inside strings and prompts.
pub fn referenced_variables(node: &Node) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut add = |name: &str| {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    };
    walk_nodes(std::slice::from_ref(node), &mut |node, _| match node {
        Node::VariableName { value } => add(value),
        Node::String { segments } | Node::MultiLineString { segments } => {
            for name in crate::ast::interpolated_variables(segments) {
                add(name);
            }
        }
        Node::Prompt(prompt) => {
            for name in crate::ast::interpolated_variables(&prompt.segments) {
                add(name);
            }
        }
        _ => {}
    });
    names
}

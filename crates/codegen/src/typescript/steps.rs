//! Step partitioning and statement lowering.
//!
//! A definition body becomes a sequence of steps, one per top-level
//! statement, each behind a guard on the frame's cursor:
//!
//! ```text
//! if (__stack.step <= 2) {
//!   ...
//!   __stack.step = 3;
//! }
//! ```
//!
//! Re-entering a body with a restored frame skips every step that already
//! completed. Nested bodies (if/while/match/time) run inside their enclosing
//! step.

use super::expr::{Body, BodyKind};
use super::writer::CodeWriter;
use crate::error::CodegenError;
use agency_parser::walk::referenced_variables;
use agency_parser::{FunctionCall, MatchPattern, Node};
use std::collections::HashSet;
use tracing::trace;

/// How consecutive steps are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepGroup {
    /// One guarded step.
    Single(usize),
    /// Independent async steps run together under `Promise.all`.
    Parallel(Vec<usize>),
}

/// The statements of `body` that become steps.
pub fn step_statements(body: &[Node]) -> Vec<&Node> {
    body.iter().filter(|node| is_step(node)).collect()
}

fn is_step(node: &Node) -> bool {
    !node.is_trivia()
        && !matches!(
            node,
            Node::Function(_)
                | Node::GraphNode(_)
                | Node::ImportStatement { .. }
                | Node::ImportNodeStatement { .. }
                | Node::ImportToolStatement { .. }
        )
}

/// The assignment target and value of a statement that may join a parallel
/// group: a call or prompt marked `async`, bare or assigned.
fn parallel_candidate(node: &Node) -> Option<(Option<&str>, &Node)> {
    let (target, value) = match node {
        Node::Assignment {
            variable_name,
            value,
            ..
        } => (Some(variable_name.as_str()), value.as_ref()),
        other => (None, other),
    };
    let root = match value {
        Node::Await { expression } => expression.as_ref(),
        other => other,
    };
    let is_async = match root {
        Node::FunctionCall(call) => call.is_async == Some(true),
        Node::Prompt(prompt) => prompt.is_async == Some(true),
        _ => false,
    };
    is_async.then_some((target, value))
}

/// Group step statements. Runs of two or more async statements that cannot
/// interrupt become parallel groups; a statement reading or writing a
/// variable written earlier in the run (or writing one read earlier) starts
/// a new run.
pub fn plan_steps(statements: &[&Node], can_interrupt: impl Fn(&Node) -> bool) -> Vec<StepGroup> {
    let mut groups = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    let mut writes: HashSet<&str> = HashSet::new();
    let mut reads: HashSet<String> = HashSet::new();

    fn flush(groups: &mut Vec<StepGroup>, run: &mut Vec<usize>) {
        match run.len() {
            0 => {}
            1 => groups.push(StepGroup::Single(run[0])),
            _ => groups.push(StepGroup::Parallel(std::mem::take(run))),
        }
        run.clear();
    }

    for (index, node) in statements.iter().enumerate() {
        let candidate = parallel_candidate(node).filter(|_| !can_interrupt(node));
        let Some((target, value)) = candidate else {
            flush(&mut groups, &mut run);
            writes.clear();
            reads.clear();
            groups.push(StepGroup::Single(index));
            continue;
        };
        let used = referenced_variables(value);
        let conflicts = used.iter().any(|name| writes.contains(name.as_str()))
            || target.is_some_and(|t| writes.contains(t) || reads.contains(t));
        if conflicts {
            flush(&mut groups, &mut run);
            writes.clear();
            reads.clear();
        }
        run.push(index);
        reads.extend(used);
        if let Some(target) = target {
            writes.insert(target);
        }
    }
    flush(&mut groups, &mut run);
    groups
}

impl Body<'_, '_> {
    /// Emit `body` as guarded steps. Returns the number of steps.
    pub(crate) fn emit_steps(&mut self, w: &mut CodeWriter, body: &[Node]) -> Result<usize, CodegenError> {
        let statements = step_statements(body);
        let module = self.module;
        let groups = plan_steps(&statements, |node| module.can_interrupt(node));
        for group in &groups {
            match group {
                StepGroup::Single(step) => self.emit_guarded(w, *step, statements[*step])?,
                StepGroup::Parallel(steps) => {
                    trace!(owner = %self.owner, ?steps, "parallel group");
                    w.open("await Promise.all([");
                    for step in steps {
                        w.open("(async () => {");
                        w.open(&format!("if (__stack.step <= {}) {{", step));
                        self.statement(w, statements[*step])?;
                        w.close("}");
                        w.close("})(),");
                    }
                    w.close("]);");
                    if let Some(last) = steps.last() {
                        w.line(&format!("if (__stack.step <= {}) __stack.step = {};", last, last + 1));
                    }
                }
            }
        }
        Ok(statements.len())
    }

    fn emit_guarded(&mut self, w: &mut CodeWriter, step: usize, node: &Node) -> Result<(), CodegenError> {
        w.open(&format!("if (__stack.step <= {}) {{", step));
        self.statement(w, node)?;
        if !matches!(node, Node::Return { .. }) {
            w.line(&format!("__stack.step = {};", step + 1));
        }
        w.close("}");
        Ok(())
    }

    /// Emit the module's top-level statements in order, unguarded.
    pub(crate) fn emit_sequence(&mut self, w: &mut CodeWriter, body: &[Node]) -> Result<(), CodegenError> {
        for node in step_statements(body) {
            self.statement(w, node)?;
        }
        Ok(())
    }

    /// Statements of a nested body, comments included.
    fn block(&mut self, w: &mut CodeWriter, body: &[Node]) -> Result<(), CodegenError> {
        for node in body {
            self.statement(w, node)?;
        }
        Ok(())
    }

    pub(crate) fn statement(&mut self, w: &mut CodeWriter, node: &Node) -> Result<(), CodegenError> {
        let mut hoists = Vec::new();
        match node {
            Node::Assignment {
                variable_name,
                type_hint,
                value,
            } => {
                let declared = type_hint
                    .clone()
                    .or_else(|| self.vars.declared.get(variable_name).cloned());
                let value = match value.as_ref() {
                    Node::Prompt(prompt) => self.prompt(prompt, declared.as_ref(), &mut hoists)?,
                    other => self.expr(other, &mut hoists)?,
                };
                w.lines(&hoists.join("\n"));
                w.line(&format!("{} = {};", self.variable(variable_name), value));
            }
            Node::Return { value: None } => {
                if self.kind != BodyKind::Module {
                    w.line("return;");
                }
            }
            Node::Return { value: Some(value) } => {
                if let (BodyKind::GraphNode, Node::FunctionCall(call)) = (self.kind, value.as_ref()) {
                    if self.module.is_graph_node(&call.function_name) {
                        return self.go_to_node(w, call);
                    }
                }
                let text = self.expr(value, &mut hoists)?;
                w.lines(&hoists.join("\n"));
                if self.kind == BodyKind::Module {
                    w.line(&format!("{};", text));
                } else {
                    w.line(&format!("return {};", text));
                }
            }
            Node::IfElse {
                condition,
                then_body,
                else_body,
            } => {
                let condition = self.expr(condition, &mut hoists)?;
                w.lines(&hoists.join("\n"));
                w.open(&format!("if ({}) {{", condition));
                self.block(w, then_body)?;
                if let Some(else_body) = else_body {
                    w.reopen("} else {");
                    self.block(w, else_body)?;
                }
                w.close("}");
            }
            Node::WhileLoop { condition, body } => {
                let condition = self.expr(condition, &mut hoists)?;
                if hoists.is_empty() {
                    w.open(&format!("while ({}) {{", condition));
                } else {
                    w.open("while (true) {");
                    w.lines(&hoists.join("\n"));
                    w.line(&format!("if (!({})) break;", condition));
                }
                self.block(w, body)?;
                w.close("}");
            }
            Node::MatchBlock { expression, cases } => {
                let subject = self.expr(expression, &mut hoists)?;
                w.lines(&hoists.join("\n"));
                let temp = self.temp("m");
                w.line(&format!("const {} = {};", temp, subject));
                let literal_cases = cases.iter().filter_map(|case| match &case.pattern {
                    MatchPattern::Literal(pattern) => Some((pattern, case.body.as_ref())),
                    MatchPattern::Default => None,
                });
                let mut opened = false;
                for (pattern, body) in literal_cases {
                    let mut pattern_hoists = Vec::new();
                    let pattern = self.expr(pattern, &mut pattern_hoists)?;
                    let header = format!("if ({} === {}) {{", temp, pattern);
                    if opened {
                        w.reopen(&format!("}} else {}", header));
                    } else {
                        w.open(&header);
                        opened = true;
                    }
                    self.statement(w, body)?;
                }
                let default = cases
                    .iter()
                    .find(|case| matches!(case.pattern, MatchPattern::Default));
                if let Some(default) = default {
                    if opened {
                        w.reopen("} else {");
                    } else {
                        w.open("{");
                        opened = true;
                    }
                    self.statement(w, &default.body)?;
                }
                if opened {
                    w.close("}");
                }
            }
            Node::TimeBlock { body } => {
                let start = self.temp("time");
                w.line(&format!("const {} = Date.now();", start));
                self.block(w, body)?;
                w.line(&format!("console.log(`time: ${{Date.now() - {}}}ms`);", start));
            }
            Node::SpecialVar { name, value } => {
                let value = self.expr(value, &mut hoists)?;
                w.lines(&hoists.join("\n"));
                w.line(&format!("__config.{} = {};", name, value));
            }
            Node::Comment { content } => w.line(&format!("//{}", content)),
            Node::MultiLineComment { content } => w.line(&format!("/*{}*/", content)),
            Node::NewLine
            | Node::UsesTool { .. }
            | Node::TypeHint { .. }
            | Node::TypeAlias { .. }
            | Node::Function(_)
            | Node::GraphNode(_)
            | Node::ImportStatement { .. }
            | Node::ImportNodeStatement { .. }
            | Node::ImportToolStatement { .. } => {}
            expression => {
                let text = self.expr(expression, &mut hoists)?;
                let hoisted = hoists
                    .iter()
                    .any(|line| line.starts_with(&format!("const {} = ", text)));
                w.lines(&hoists.join("\n"));
                if !hoisted {
                    w.line(&format!("{};", text));
                }
            }
        }
        Ok(())
    }

    /// `return node(...)` inside a graph node: hand control to `node`.
    fn go_to_node(&mut self, w: &mut CodeWriter, call: &FunctionCall) -> Result<(), CodegenError> {
        let mut hoists = Vec::new();
        let mut args = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            args.push(self.expr(arg, &mut hoists)?);
        }
        w.lines(&hoists.join("\n"));
        w.line(&format!(
            "return goToNode(\"{}\", [{}]);",
            call.function_name,
            args.join(", ")
        ));
        Ok(())
    }
}

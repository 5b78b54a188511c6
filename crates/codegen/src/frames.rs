//! Reference model of the generated frame stack.
//!
//! The TypeScript `StateStack` emitted in every module follows exactly this
//! behavior; keeping a Rust model lets the resumption rules be tested without
//! a JavaScript runtime.
//!
//! - In **serialize** mode each invocation pushes a fresh [`Frame`].
//! - In **deserialize** mode restorable invocations take the frames of a saved
//!   stack in their original order (outermost first), restoring step cursors,
//!   arguments and locals. When the saved frames run out the stack reverts to
//!   serialize mode.
//!
//! Only invocations that can interrupt are restorable. Every frame in a saved
//! stack belongs to one, so a call that cannot interrupt always starts fresh
//! and leaves the saved frames for the calls they were captured from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// One invocation's resumable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Index of the first step that has not completed.
    pub step: usize,
    pub args: IndexMap<String, Value>,
    pub locals: IndexMap<String, Value>,
}

/// Whether invocations create frames or restore saved ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    #[default]
    Serialize,
    Deserialize,
}

/// What an interrupt carries: the frames live at the moment it was raised,
/// shared globals, and the graph nodes entered so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStack {
    pub stack: Vec<Frame>,
    #[serde(default)]
    pub global: IndexMap<String, Value>,
    #[serde(default)]
    pub nodes_traversed: Vec<String>,
}

impl SavedStack {
    /// The graph node to re-enter on resumption.
    pub fn last_node(&self) -> Option<&str> {
        self.nodes_traversed.last().map(String::as_str)
    }
}

/// A per-run stack of frames. Never shared between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStack {
    stack: Vec<Frame>,
    mode: StackMode,
    pending: VecDeque<Frame>,
    pub global: IndexMap<String, Value>,
    pub nodes_traversed: Vec<String>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a stack that will hand out `saved` frames before fresh ones.
    pub fn restore(saved: SavedStack) -> Self {
        let pending: VecDeque<Frame> = saved.stack.into();
        let mode = if pending.is_empty() {
            StackMode::Serialize
        } else {
            StackMode::Deserialize
        };
        Self {
            stack: Vec::new(),
            mode,
            pending,
            global: saved.global,
            nodes_traversed: saved.nodes_traversed,
        }
    }

    /// Parse a saved stack from JSON and restore it.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::restore(serde_json::from_str(json)?))
    }

    pub fn mode(&self) -> StackMode {
        self.mode
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Saved frames not yet handed out.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Enter an invocation. Returns its frame and whether it was restored.
    pub fn get_new_state(&mut self, restorable: bool) -> (&mut Frame, bool) {
        let restored = match self.mode {
            StackMode::Deserialize if restorable => self.pending.pop_front(),
            _ => None,
        };
        if self.pending.is_empty() {
            self.mode = StackMode::Serialize;
        }
        let is_restored = restored.is_some();
        self.stack.push(restored.unwrap_or_default());
        let len = self.stack.len();
        (&mut self.stack[len - 1], is_restored)
    }

    /// Leave the current invocation.
    pub fn pop(&mut self) -> Option<Frame> {
        self.stack.pop()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.stack.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        self.stack.last_mut()
    }

    /// Snapshot of the live frames, outermost first.
    pub fn save(&self) -> SavedStack {
        SavedStack {
            stack: self.stack.clone(),
            global: self.global.clone(),
            nodes_traversed: self.nodes_traversed.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.save())
    }
}

/// How a human answered an interrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InterruptResponse {
    /// Run the tool call as requested.
    Approve,
    /// Skip the tool call; `value` (or a default message) becomes its result.
    Reject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Run the tool call with replacement arguments.
    Modify { new_arguments: IndexMap<String, Value> },
}

/// The state an interrupt raised from a prompt's tool call carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterruptState {
    /// Conversation so far, including the assistant turn that asked for the tool.
    #[serde(default)]
    pub messages: Vec<Value>,
    /// The tool call awaiting approval; `None` for a direct `interrupt(...)`.
    #[serde(default)]
    pub tool_call: Option<Value>,
    pub stack: SavedStack,
    #[serde(default)]
    pub nodes_traversed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// node main -> def outer -> def inner, interrupted at inner's step 2.
    fn interrupted_stack() -> FrameStack {
        let mut stack = FrameStack::new();
        stack.nodes_traversed.push("main".to_string());

        let (main, restored) = stack.get_new_state(true);
        assert!(!restored);
        main.step = 1;
        main.args.insert("city".to_string(), json!("Paris"));

        let (outer, _) = stack.get_new_state(true);
        outer.step = 3;
        outer.locals.insert("coords".to_string(), json!({ "x": 1 }));

        let (inner, _) = stack.get_new_state(true);
        inner.step = 2;
        stack
    }

    #[test]
    fn test_serialize_mode_pushes_fresh_frames() {
        let mut stack = FrameStack::new();
        let (frame, restored) = stack.get_new_state(true);
        assert_eq!(*frame, Frame::default());
        assert!(!restored);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.mode(), StackMode::Serialize);
    }

    #[test]
    fn test_restore_hands_out_frames_in_order() {
        let saved = interrupted_stack().save();
        let mut resumed = FrameStack::restore(saved.clone());
        assert_eq!(resumed.mode(), StackMode::Deserialize);

        let steps: Vec<(usize, bool)> = (0..3)
            .map(|_| {
                let (frame, restored) = resumed.get_new_state(true);
                (frame.step, restored)
            })
            .collect();
        assert_eq!(steps, vec![(1, true), (3, true), (2, true)]);
        assert_eq!(resumed.mode(), StackMode::Serialize);
        assert_eq!(resumed.save().stack, saved.stack);
    }

    #[test]
    fn test_calls_that_cannot_interrupt_start_fresh() {
        // node main -> ask(total(1, 2)), interrupted inside ask at step 1
        let mut stack = FrameStack::new();
        let (main, _) = stack.get_new_state(true);
        main.step = 2;
        let (ask, _) = stack.get_new_state(true);
        ask.step = 1;
        ask.args.insert("n".to_string(), json!(3));
        let saved = stack.save();

        let mut resumed = FrameStack::restore(saved);
        let (main, restored) = resumed.get_new_state(true);
        assert_eq!((main.step, restored), (2, true));

        let (total, restored) = resumed.get_new_state(false);
        assert_eq!((total.step, restored), (0, false));
        assert_eq!(resumed.pending(), 1);
        assert_eq!(resumed.mode(), StackMode::Deserialize);
        resumed.pop();

        let (ask, restored) = resumed.get_new_state(true);
        assert!(restored);
        assert_eq!(ask.step, 1);
        assert_eq!(ask.args.get("n"), Some(&json!(3)));
        assert_eq!(resumed.mode(), StackMode::Serialize);
    }

    #[test]
    fn test_reverts_to_serialize_when_exhausted() {
        let mut resumed = FrameStack::restore(interrupted_stack().save());
        for _ in 0..3 {
            resumed.get_new_state(true);
        }
        let (frame, restored) = resumed.get_new_state(true);
        assert!(!restored);
        assert_eq!(frame.step, 0);
        assert_eq!(resumed.pending(), 0);
    }

    #[test]
    fn test_json_survives_round_trip() {
        let stack = interrupted_stack();
        let json = stack.to_json().unwrap();
        let mut resumed = FrameStack::from_json(&json).unwrap();
        assert_eq!(resumed.nodes_traversed, vec!["main".to_string()]);
        let (main, _) = resumed.get_new_state(true);
        assert_eq!(main.args.get("city"), Some(&json!("Paris")));
        let (outer, _) = resumed.get_new_state(true);
        assert_eq!(outer.locals.get("coords"), Some(&json!({ "x": 1 })));
    }

    #[test]
    fn test_json_shape_matches_generated_stack() {
        let mut stack = FrameStack::new();
        let (frame, _) = stack.get_new_state(true);
        frame.step = 2;
        assert_eq!(
            serde_json::to_value(stack.save()).unwrap(),
            json!({
                "stack": [{ "step": 2, "args": {}, "locals": {} }],
                "global": {},
                "nodesTraversed": []
            })
        );
    }

    #[test]
    fn test_empty_saved_stack_starts_in_serialize_mode() {
        let resumed = FrameStack::restore(SavedStack::default());
        assert_eq!(resumed.mode(), StackMode::Serialize);
    }

    #[test]
    fn test_interrupt_responses() {
        let approve: InterruptResponse = serde_json::from_value(json!({ "type": "approve" })).unwrap();
        assert_eq!(approve, InterruptResponse::Approve);

        let reject: InterruptResponse =
            serde_json::from_value(json!({ "type": "reject", "value": "not today" })).unwrap();
        assert_eq!(
            reject,
            InterruptResponse::Reject {
                value: Some(json!("not today"))
            }
        );

        let modify: InterruptResponse = serde_json::from_value(
            json!({ "type": "modify", "newArguments": { "amount": 10 } }),
        )
        .unwrap();
        let InterruptResponse::Modify { new_arguments } = modify else {
            panic!("expected modify");
        };
        assert_eq!(new_arguments.get("amount"), Some(&json!(10)));
    }

    #[test]
    fn test_interrupt_state_last_node() {
        let state: InterruptState = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "refund order 7" }],
            "toolCall": { "name": "refund", "arguments": { "amount": 7 } },
            "stack": { "stack": [], "nodesTraversed": ["triage", "refund"] },
            "nodesTraversed": ["triage", "refund"]
        }))
        .unwrap();
        assert_eq!(state.stack.last_node(), Some("refund"));
        assert!(state.tool_call.is_some());
    }
}

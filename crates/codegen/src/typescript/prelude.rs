//! Runtime imports and the fixed prelude emitted at the top of every module.

use std::collections::BTreeSet;

/// Runtime values the generated code itself relies on.
pub const CORE_IMPORTS: &[&str] = &[
    "client",
    "userMessage",
    "assistantMessage",
    "toolMessage",
    "SimpleMachine",
    "interrupt",
    "isInterrupt",
    "deepClone",
];

/// Built-in functions Agency programs may call directly.
pub const BUILTINS: &[&str] = &[
    "print",
    "input",
    "read",
    "write",
    "readImage",
    "fetch",
    "fetchJSON",
    "fetchJson",
    "fetchMarkdown",
    "sleep",
    "interrupt",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// The runtime import line, leaving out excluded built-ins.
pub fn runtime_import(module: &str, excluded: &[String]) -> String {
    let mut seen = BTreeSet::new();
    let names: Vec<&str> = CORE_IMPORTS
        .iter()
        .chain(BUILTINS.iter().filter(|b| !excluded.iter().any(|e| e == *b)))
        .copied()
        .filter(|name| seen.insert(*name))
        .collect();
    format!(
        "import {{ {} }} from {};",
        names.join(", "),
        super::schema::quote(module)
    )
}

/// Frame stack, prompt loop, interrupt plumbing and graph adapters.
///
/// `StateStack` behaves exactly like [`crate::FrameStack`].
pub const PRELUDE: &str = r#"type Frame = { step: number; args: Record<string, any>; locals: Record<string, any> };

export class StateStack {
  stack: Frame[] = [];
  mode: "serialize" | "deserialize" = "serialize";
  deserializeStack: Frame[] = [];
  global: Record<string, any> = {};
  nodesTraversed: string[] = [];

  getNewState(restorable: boolean): { frame: Frame; restored: boolean } {
    const saved =
      restorable && this.mode === "deserialize" ? this.deserializeStack.shift() : undefined;
    if (this.deserializeStack.length === 0) {
      this.mode = "serialize";
    }
    const frame = saved ?? { step: 0, args: {}, locals: {} };
    this.stack.push(frame);
    return { frame, restored: saved !== undefined };
  }

  pop(frame: Frame): void {
    const index = this.stack.lastIndexOf(frame);
    if (index >= 0) {
      this.stack.splice(index, 1);
    }
  }

  discardPending(): void {
    this.deserializeStack = [];
    this.mode = "serialize";
  }

  toJSON(): any {
    return deepClone({ stack: this.stack, global: this.global, nodesTraversed: this.nodesTraversed });
  }

  static fromJSON(json: any): StateStack {
    const restored = new StateStack();
    restored.deserializeStack = deepClone(json?.stack ?? []);
    restored.mode = restored.deserializeStack.length > 0 ? "deserialize" : "serialize";
    restored.global = deepClone(json?.global ?? {});
    restored.nodesTraversed = [...(json?.nodesTraversed ?? [])];
    return restored;
  }
}

export type InterruptResponse =
  | { type: "approve" }
  | { type: "reject"; value?: any }
  | { type: "modify"; newArguments: Record<string, any> };

export type RunState = { stack: StateStack; resume?: InterruptResponse; pending?: any };

function __newRunState(): RunState {
  return { stack: new StateStack() };
}

export const __config: Record<string, any> = {};

function __interrupt(__state: RunState, data: any): any {
  const response = __state.pending === undefined ? __state.resume : undefined;
  if (response !== undefined) {
    __state.resume = undefined;
    switch (response.type) {
      case "approve":
        return true;
      case "reject":
        return response.value ?? false;
      case "modify":
        return response.newArguments;
    }
  }
  const raised: any = interrupt(data);
  raised.state = {
    messages: [],
    toolCall: null,
    stack: __state.stack.toJSON(),
    nodesTraversed: [...__state.stack.nodesTraversed],
  };
  return raised;
}

type PromptRequest = {
  prompt: string;
  tools: any[];
  handlers: Record<string, (args: any, __state: RunState) => Promise<any>>;
  responseFormat?: any;
  stream?: boolean;
};

function __parseOutput(content: string): any {
  try {
    return JSON.parse(content).value;
  } catch {
    return content;
  }
}

async function __runPrompt(__state: RunState, request: PromptRequest): Promise<any> {
  let messages: any[] = [userMessage(request.prompt)];
  let queued: any[] = [];
  let resumed: InterruptResponse | undefined;
  if (__state.pending?.toolCall) {
    messages = __state.pending.messages;
    queued = [__state.pending.toolCall, ...(__state.pending.queuedToolCalls ?? [])];
    resumed = __state.resume;
    __state.pending = undefined;
  }
  while (true) {
    while (queued.length > 0) {
      const toolCall = queued.shift();
      const handler = request.handlers[toolCall.name];
      if (handler === undefined) {
        throw new Error(`model called unknown tool '${toolCall.name}'`);
      }
      let output: any;
      if (resumed?.type === "reject") {
        __state.stack.discardPending();
        __state.resume = undefined;
        output = resumed.value ?? "rejected";
      } else if (resumed?.type === "modify") {
        __state.stack.discardPending();
        __state.resume = { type: "approve" };
        output = await handler(resumed.newArguments, __state);
      } else {
        output = await handler(toolCall.arguments, __state);
      }
      resumed = undefined;
      if (isInterrupt(output)) {
        output.state = {
          ...output.state,
          messages: deepClone(messages),
          toolCall,
          queuedToolCalls: deepClone(queued),
        };
        return output;
      }
      messages.push(toolMessage(toolCall, output));
    }
    const result = await client.text({
      messages,
      tools: request.tools,
      responseFormat: request.responseFormat,
      stream: request.stream ?? false,
    });
    if (!result.success) {
      throw new Error(`LLM call failed: ${result.error}`);
    }
    const reply = result.value;
    messages.push(assistantMessage(reply));
    if (!reply.toolCalls || reply.toolCalls.length === 0) {
      return request.responseFormat ? __parseOutput(reply.content) : reply.content;
    }
    queued = [...reply.toolCalls];
  }
}

type GoToNode = { __goToNode: true; node: string; data: any[] };

function goToNode(node: string, data: any[]): GoToNode {
  return { __goToNode: true, node, data };
}

function __isGoToNode(value: any): value is GoToNode {
  return typeof value === "object" && value !== null && value.__goToNode === true;
}

function __arg(data: any, index: number, name: string): any {
  return Array.isArray(data) ? data[index] : data?.[name];
}

type GraphState = { data: any; __state: RunState; next?: string; result?: any };

function __adapt(fn: (data: any, __state: RunState) => Promise<any>) {
  return async (state: GraphState): Promise<GraphState> => {
    const result = await fn(state.data, state.__state);
    if (__isGoToNode(result)) {
      return { ...state, data: result.data, next: result.node, result: undefined };
    }
    return { ...state, next: undefined, result };
  };
}

function __route(state: GraphState): string | undefined {
  return state.next;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_import_skips_excluded() {
        let line = runtime_import("agency-lang/runtime", &["fetch".to_string(), "print".to_string()]);
        assert!(line.starts_with("import { client, userMessage,"));
        assert!(line.ends_with("} from \"agency-lang/runtime\";"));
        assert!(!line.contains(" fetch,"));
        assert!(!line.contains(" print,"));
        assert!(line.contains("fetchJSON"));
    }

    #[test]
    fn test_interrupt_imported_once() {
        let line = runtime_import("agency-lang/runtime", &[]);
        assert_eq!(line.matches(" interrupt,").count() + line.matches(" interrupt }").count(), 1);
    }
}

//! Expression lowering.
//!
//! Calls that may interrupt are hoisted out of the expression into a
//! temporary followed by an `isInterrupt` check, so an interrupt leaves the
//! body before anything after it runs. Hoisted lines are collected in the
//! `hoists` buffer the caller writes ahead of the statement.

use super::context::{BodyVariables, ModuleInfo};
use super::prelude::is_builtin;
use super::schema::{property_key, quote, response_format};
use crate::error::CodegenError;
use agency_parser::{BinOp, FunctionCall, Node, PromptLiteral, PromptSegment, VariableType};

/// What kind of body is being lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    Module,
    Function,
    GraphNode,
}

/// Lowering state for one function, graph node or the module's top level.
pub(crate) struct Body<'m, 'a> {
    pub module: &'m ModuleInfo<'a>,
    pub kind: BodyKind,
    pub owner: String,
    pub vars: BodyVariables,
    temps: usize,
}

impl<'m, 'a> Body<'m, 'a> {
    pub fn new(module: &'m ModuleInfo<'a>, kind: BodyKind, owner: impl Into<String>, vars: BodyVariables) -> Self {
        Self {
            module,
            kind,
            owner: owner.into(),
            vars,
            temps: 0,
        }
    }

    /// A fresh temporary name.
    pub fn temp(&mut self, prefix: &str) -> String {
        let name = format!("__{}{}", prefix, self.temps);
        self.temps += 1;
        name
    }

    /// Storage location of a variable.
    pub fn variable(&self, name: &str) -> String {
        if self.kind == BodyKind::Module {
            name.to_string()
        } else if self.vars.params.contains(name) {
            format!("__stack.args.{}", name)
        } else if self.vars.locals.contains(name) {
            format!("__stack.locals.{}", name)
        } else {
            name.to_string()
        }
    }

    pub fn expr(&mut self, node: &Node, hoists: &mut Vec<String>) -> Result<String, CodegenError> {
        Ok(match node {
            Node::Number { value } => value.clone(),
            Node::Boolean { value } => value.to_string(),
            Node::String { segments } | Node::MultiLineString { segments } => self.string(segments),
            Node::VariableName { value } => self.variable(value),
            Node::Prompt(prompt) => self.prompt(prompt, None, hoists)?,
            Node::FunctionCall(call) => self.call(call, hoists)?,
            Node::DotProperty {
                object,
                property_name,
            } => format!("{}.{}", self.expr(object, hoists)?, property_name),
            Node::IndexAccess { array, index } => {
                format!("{}[{}]", self.expr(array, hoists)?, self.expr(index, hoists)?)
            }
            Node::DotFunctionCall {
                object,
                function_call,
            } => {
                let object = self.expr(object, hoists)?;
                let args = self.arguments(&function_call.arguments, hoists)?;
                format!("{}.{}({})", object, function_call.function_name, args.join(", "))
            }
            Node::BinOpExpression {
                operator,
                left,
                right,
            } => {
                let left = self.expr(left, hoists)?;
                let right = self.expr(right, hoists)?;
                format!("{} {} {}", left, ts_operator(*operator), right)
            }
            Node::Array { items } => format!("[{}]", self.arguments(items, hoists)?.join(", ")),
            Node::Object { entries } => {
                if entries.is_empty() {
                    return Ok("{}".to_string());
                }
                let mut fields = Vec::with_capacity(entries.len());
                for entry in entries {
                    fields.push(format!("{}: {}", property_key(&entry.key), self.expr(&entry.value, hoists)?));
                }
                format!("{{ {} }}", fields.join(", "))
            }
            Node::Await { expression } => format!("await ({})", self.expr(expression, hoists)?),
            other => {
                return Err(CodegenError::InvalidExpression {
                    kind: other.type_name(),
                    owner: self.owner.clone(),
                })
            }
        })
    }

    fn arguments(&mut self, args: &[Node], hoists: &mut Vec<String>) -> Result<Vec<String>, CodegenError> {
        args.iter().map(|arg| self.expr(arg, hoists)).collect()
    }

    /// A string literal, as a template literal when it interpolates.
    pub fn string(&self, segments: &[PromptSegment]) -> String {
        let interpolates = segments
            .iter()
            .any(|s| matches!(s, PromptSegment::Interpolation { .. }));
        if !interpolates {
            let text: String = segments
                .iter()
                .map(|s| match s {
                    PromptSegment::Text { value } => value.as_str(),
                    PromptSegment::Interpolation { .. } => "",
                })
                .collect();
            return quote(&text);
        }
        self.template(segments)
    }

    fn template(&self, segments: &[PromptSegment]) -> String {
        let mut out = String::from("`");
        for segment in segments {
            match segment {
                PromptSegment::Text { value } => out.push_str(&escape_template(value)),
                PromptSegment::Interpolation { variable_name } => {
                    out.push_str("${");
                    out.push_str(&self.variable(variable_name));
                    out.push('}');
                }
            }
        }
        out.push('`');
        out
    }

    /// A call. Graph nodes may only be entered through `return node(...)`,
    /// which the statement lowering handles before reaching here.
    pub fn call(&mut self, call: &FunctionCall, hoists: &mut Vec<String>) -> Result<String, CodegenError> {
        let name = call.function_name.as_str();
        if self.module.is_graph_node(name) {
            return Err(CodegenError::NodeCallNotReturned {
                node: name.to_string(),
                caller: self.owner.clone(),
            });
        }
        let mut args = self.arguments(&call.arguments, hoists)?;
        let text = if self.module.functions.contains_key(name) {
            args.push("__state".to_string());
            format!("await {}({})", name, args.join(", "))
        } else if is_builtin(name) {
            if self.module.is_excluded_builtin(name) {
                return Err(CodegenError::ExcludedBuiltin {
                    name: name.to_string(),
                    caller: self.owner.clone(),
                });
            }
            if name == agency_graph::INTERRUPT_BUILTIN {
                let data = args.into_iter().next().unwrap_or_else(|| "undefined".to_string());
                format!("__interrupt(__state, {})", data)
            } else {
                format!("await {}({})", name, args.join(", "))
            }
        } else {
            format!("await {}({})", name, args.join(", "))
        };
        if self.module.call_can_interrupt(name) {
            Ok(self.hoist(text, hoists))
        } else {
            Ok(text)
        }
    }

    /// A prompt. `response_type` is the declared type of the variable the
    /// result is assigned to, if any.
    pub fn prompt(
        &mut self,
        prompt: &PromptLiteral,
        response_type: Option<&VariableType>,
        hoists: &mut Vec<String>,
    ) -> Result<String, CodegenError> {
        let mut fields = vec![format!("prompt: {}", self.template(&prompt.segments))];
        let (tools, handlers) = self.prompt_tools(prompt)?;
        fields.push(format!("tools: [{}]", tools.join(", ")));
        if handlers.is_empty() {
            fields.push("handlers: {}".to_string());
        } else {
            fields.push(format!("handlers: {{ {} }}", handlers.join(", ")));
        }
        if let Some(ty) = response_type.filter(|ty| !ty.is_any() && !ty.is_empty_type()) {
            let format = response_format(ty, &self.module.aliases);
            fields.push(format!("responseFormat: {}", serde_json::to_string(&format)?));
        }
        if prompt.is_streaming {
            fields.push("stream: true".to_string());
        }
        let text = format!("await __runPrompt(__state, {{ {} }})", fields.join(", "));
        if self.module.prompt_can_interrupt(prompt) {
            Ok(self.hoist(text, hoists))
        } else {
            Ok(text)
        }
    }

    /// Move an interrupt-capable call into a temporary. Inside definitions an
    /// interrupt result returns immediately.
    fn hoist(&mut self, text: String, hoists: &mut Vec<String>) -> String {
        let temp = self.temp("t");
        hoists.push(format!("const {} = {};", temp, text));
        if self.kind != BodyKind::Module {
            hoists.push(format!("if (isInterrupt({temp})) return {temp};"));
        }
        temp
    }
}

fn ts_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "===",
        BinOp::Ne => "!==",
        other => other.as_str(),
    }
}

fn escape_template(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typescript::CodegenOptions;
    use agency_graph::{preprocess, PreprocessOptions};
    use agency_parser::{parse, parse_expression};
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"def approve(amount: number) {
  return interrupt("refund ${amount}?")
}

def total(a: number, b: number) {
  return a + b
}

node done() {
  print("done")
}
"#;

    fn lower(expression: &str) -> Result<(String, Vec<String>), CodegenError> {
        let program = parse(SOURCE).unwrap();
        let pre = preprocess(&program, &PreprocessOptions::default()).unwrap();
        let options = CodegenOptions::default();
        let module = ModuleInfo::new(&pre, &options);
        let vars = BodyVariables::scan(vec!["city".to_string()], &parse("count = 1\n").unwrap().nodes);
        let mut body = Body::new(&module, BodyKind::Function, "caller", vars);
        let mut hoists = Vec::new();
        let text = body.expr(&parse_expression(expression).unwrap(), &mut hoists)?;
        Ok((text, hoists))
    }

    #[test]
    fn test_variables_are_redirected() {
        let (text, hoists) = lower("count == city").unwrap();
        assert_eq!(text, "__stack.locals.count === __stack.args.city");
        assert!(hoists.is_empty());
    }

    #[test]
    fn test_interpolated_string_is_template() {
        let (text, _) = lower("\"weather in ${city}\"").unwrap();
        assert_eq!(text, "`weather in ${__stack.args.city}`");
    }

    #[test]
    fn test_user_call_passes_state() {
        let (text, hoists) = lower("total(1, count)").unwrap();
        assert_eq!(text, "await total(1, __stack.locals.count, __state)");
        assert!(hoists.is_empty());
    }

    #[test]
    fn test_interrupting_call_is_hoisted() {
        let (text, hoists) = lower("total(approve(5), 1)").unwrap();
        assert_eq!(text, "await total(__t0, 1, __state)");
        assert_eq!(
            hoists,
            vec![
                "const __t0 = await approve(5, __state);".to_string(),
                "if (isInterrupt(__t0)) return __t0;".to_string(),
            ]
        );
    }

    #[test]
    fn test_direct_interrupt() {
        let (text, hoists) = lower("interrupt(\"ok?\")").unwrap();
        assert_eq!(text, "__t0");
        assert_eq!(hoists[0], "const __t0 = __interrupt(__state, \"ok?\");");
    }

    #[test]
    fn test_graph_node_call_must_be_returned() {
        let err = lower("done()").unwrap_err();
        assert!(err.to_string().contains("must be returned"));
    }

    #[test]
    fn test_prompt_lowering() {
        let (text, _) = lower("`Summarize ${city}`").unwrap();
        assert_eq!(
            text,
            "await __runPrompt(__state, { prompt: `Summarize ${__stack.args.city}`, tools: [], handlers: {} })"
        );
    }

    #[test]
    fn test_template_escapes() {
        assert_eq!(escape_template("a`b${c}\\"), "a\\`b\\${c}\\\\");
    }
}

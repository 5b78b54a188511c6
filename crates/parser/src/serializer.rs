//! AST Serializer - Convert an Agency AST back to source text.
//!
//! The serializer is the formatter behind `agencyc format` and the inverse of
//! [`crate::parse`]: for every construct the grammar accepts,
//! `parse(&serialize(&program))` yields a structurally equal program.
//!
//! # Example
//!
//! ```rust
//! use agency_parser::{parse, serialize, serialize_with, FormatOptions};
//!
//! let program = parse("def add(x: number, y) { x }").unwrap();
//! assert_eq!(serialize(&program), "def add(x: number, y) {\nx\n}");
//! assert_eq!(
//!     serialize_with(&program, &FormatOptions::indented()),
//!     "def add(x: number, y) {\n  x\n}\n"
//! );
//! ```
//!
//! # Formatting
//!
//! - one statement per line, blank lines preserved
//! - bodies flush left by default; [`FormatOptions::indented`] nests them
//! - `else` on the closing-brace line
//! - strings re-escaped so they read back identically

use crate::ast::*;

/// Layout knobs for [`serialize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nested body.
    pub indent_width: usize,
    /// End the output with a newline.
    pub final_newline: bool,
}

impl FormatOptions {
    /// Two-space indentation with a trailing newline, as written to files.
    pub fn indented() -> Self {
        Self {
            indent_width: 2,
            final_newline: true,
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 0,
            final_newline: false,
        }
    }
}

/// Serialize a program to Agency source code in the canonical layout:
/// bodies flush left, no trailing newline.
pub fn serialize(program: &Program) -> String {
    serialize_with(program, &FormatOptions::default())
}

/// Serialize a program with explicit layout options.
pub fn serialize_with(program: &Program, options: &FormatOptions) -> String {
    let mut w = Writer::new(*options);
    w.write_body(&program.nodes);
    let mut out = w.finish();
    // A trailing blank line is a `newLine` node and must survive
    let ends_blank = matches!(program.nodes.last(), Some(Node::NewLine));
    if !options.final_newline && !ends_blank && out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Render a single node. Statements spanning several lines use the
/// indented layout at level zero.
pub fn serialize_node(node: &Node) -> String {
    let mut w = Writer::new(FormatOptions::indented());
    w.write_statement(node);
    w.finish()
}

/// Render a type annotation in Agency syntax.
///
/// ```rust
/// use agency_parser::{serializer::format_type, VariableType};
///
/// let ty = VariableType::array(VariableType::union(vec![
///     VariableType::primitive("number"),
///     VariableType::primitive("string"),
/// ]));
/// assert_eq!(format_type(&ty), "(number | string)[]");
/// ```
pub fn format_type(ty: &VariableType) -> String {
    match ty {
        VariableType::Primitive { value } => value.clone(),
        VariableType::Array { element_type } => match element_type.as_ref() {
            VariableType::Union { .. } => format!("({})[]", format_type(element_type)),
            other => format!("{}[]", format_type(other)),
        },
        VariableType::StringLiteral { value } => format!("\"{}\"", value),
        VariableType::NumberLiteral { value } => value.clone(),
        VariableType::BooleanLiteral { value } => value.to_string(),
        VariableType::Union { types } => types
            .iter()
            .map(|member| match member {
                VariableType::Union { .. } => format!("({})", format_type(member)),
                other => format_type(other),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        VariableType::Object { properties } => {
            if properties.is_empty() {
                "{}".to_string()
            } else {
                let props: Vec<String> = properties
                    .iter()
                    .map(|p| format!("{}: {}", p.key, format_type(&p.value)))
                    .collect();
                format!("{{ {} }}", props.join("; "))
            }
        }
        VariableType::TypeAliasVariable { alias_name } => alias_name.clone(),
    }
}

/// Internal writer for building output.
struct Writer {
    output: String,
    indent: usize,
    options: FormatOptions,
}

impl Writer {
    fn new(options: FormatOptions) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            options,
        }
    }

    fn finish(self) -> String {
        self.output
    }

    /// Write indentation at current level.
    fn write_indent(&mut self) {
        let width = self.indent * self.options.indent_width;
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        if self.indent > 0 {
            self.indent -= 1;
        }
    }

    /// Write without indentation or newline.
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// One line per statement; `newLine` nodes become empty lines.
    fn write_body(&mut self, nodes: &[Node]) {
        for node in nodes {
            if matches!(node, Node::NewLine) {
                self.newline();
            } else {
                self.write_indent();
                self.write_statement(node);
                self.newline();
            }
        }
    }

    /// `{ ... }` starting at the cursor, closing brace at the current level.
    fn write_block(&mut self, nodes: &[Node]) {
        self.write_block_with_docstring(nodes, None);
    }

    fn write_block_with_docstring(&mut self, nodes: &[Node], docstring: Option<&str>) {
        if nodes.is_empty() && docstring.is_none() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.newline();
        self.indent();
        if let Some(doc) = docstring {
            self.write_indent();
            self.write(&format!("\"\"\"{}\"\"\"", escape_text(doc, Quote::Triple)));
            self.newline();
        }
        self.write_body(nodes);
        self.dedent();
        self.write_indent();
        self.write("}");
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Write a statement starting at the cursor (indentation already written).
    fn write_statement(&mut self, node: &Node) {
        match node {
            Node::Assignment {
                variable_name,
                type_hint,
                value,
            } => {
                let text = match type_hint {
                    Some(ty) => format!(
                        "{}: {} = {}",
                        variable_name,
                        format_type(ty),
                        expression(value)
                    ),
                    None => format!("{} = {}", variable_name, expression(value)),
                };
                self.write(&text);
            }
            Node::Return { value } => match value {
                Some(value) => self.write(&format!("return {}", expression(value))),
                None => self.write("return"),
            },
            Node::IfElse {
                condition,
                then_body,
                else_body,
            } => self.write_if_else(condition, then_body, else_body.as_deref()),
            Node::WhileLoop { condition, body } => {
                self.write(&format!("while ({}) ", expression(condition)));
                self.write_block(body);
            }
            Node::MatchBlock { expression: subject, cases } => {
                self.write(&format!("match({}) {{", expression(subject)));
                self.newline();
                self.indent();
                for case in cases {
                    self.write_indent();
                    match &case.pattern {
                        MatchPattern::Literal(pattern) => {
                            self.write(&format!("{} => ", expression(pattern)))
                        }
                        MatchPattern::Default => self.write("_ => "),
                    }
                    self.write_statement(&case.body);
                    self.newline();
                }
                self.dedent();
                self.write_indent();
                self.write("}");
            }
            Node::TimeBlock { body } => {
                self.write("time ");
                self.write_block(body);
            }
            Node::SpecialVar { name, value } => {
                self.write(&format!("@{} = {}", name, expression(value)));
            }
            Node::Comment { content } => self.write(&format!("//{}", content)),
            Node::MultiLineComment { content } => self.write(&format!("/*{}*/", content)),
            Node::ImportStatement {
                import_clause,
                module_path,
            } => self.write(&format!("import {} from \"{}\"", import_clause, module_path)),
            Node::ImportNodeStatement {
                node_names,
                module_path,
            } => self.write(&format!(
                "import node {{ {} }} from \"{}\"",
                node_names.join(", "),
                module_path
            )),
            Node::ImportToolStatement {
                tool_names,
                module_path,
            } => self.write(&format!(
                "import tool {{ {} }} from \"{}\"",
                tool_names.join(", "),
                module_path
            )),
            Node::UsesTool { tool_names } => self.write(&format!("+{}", tool_names.join(", "))),
            Node::TypeHint {
                variable_name,
                variable_type,
            } => self.write(&format!("{} :: {}", variable_name, format_type(variable_type))),
            Node::TypeAlias {
                alias_name,
                aliased_type,
            } => self.write(&format!("type {} = {}", alias_name, format_type(aliased_type))),
            Node::Function(def) => {
                let prefix = match def.is_async {
                    Some(true) => "async ",
                    Some(false) => "sync ",
                    None => "",
                };
                self.write(&format!(
                    "{}def {}({}){} ",
                    prefix,
                    def.function_name,
                    parameters(&def.parameters),
                    return_type(def.return_type.as_ref())
                ));
                self.write_block_with_docstring(&def.body, def.docstring.as_deref());
            }
            Node::GraphNode(def) => {
                self.write(&format!(
                    "node {}({}){} ",
                    def.node_name,
                    parameters(&def.parameters),
                    return_type(def.return_type.as_ref())
                ));
                self.write_block(&def.body);
            }
            Node::NewLine => {}
            expr => self.write(&expression(expr)),
        }
    }

    fn write_if_else(&mut self, condition: &Node, then_body: &[Node], else_body: Option<&[Node]>) {
        self.write(&format!("if ({}) ", expression(condition)));
        self.write_block(then_body);
        match else_body {
            None => {}
            Some(
                [Node::IfElse {
                    condition,
                    then_body,
                    else_body,
                }],
            ) => {
                self.write(" else ");
                self.write_if_else(condition, then_body, else_body.as_deref());
            }
            Some(body) => {
                self.write(" else ");
                self.write_block(body);
            }
        }
    }
}

fn parameters(params: &[FunctionParameter]) -> String {
    params
        .iter()
        .map(|p| match &p.type_hint {
            Some(ty) => format!("{}: {}", p.name, format_type(ty)),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_type(ty: Option<&VariableType>) -> String {
    match ty {
        Some(ty) => format!(": {}", format_type(ty)),
        None => String::new(),
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Render an expression on a single line (nested literals may span lines).
pub fn expression(node: &Node) -> String {
    match node {
        Node::Number { value } => value.clone(),
        Node::String { segments } => format!("\"{}\"", escape_segments(segments, Quote::Double)),
        Node::MultiLineString { segments } => {
            format!("\"\"\"{}\"\"\"", escape_segments(segments, Quote::Triple))
        }
        Node::Boolean { value } => value.to_string(),
        Node::VariableName { value } => value.clone(),
        Node::Prompt(prompt) => {
            let body = format!("`{}`", escape_segments(&prompt.segments, Quote::Backtick));
            if prompt.is_streaming {
                format!("stream {}", body)
            } else {
                body
            }
        }
        Node::FunctionCall(call) => call_text(call),
        Node::DotProperty {
            object,
            property_name,
        } => format!("{}.{}", expression(object), property_name),
        Node::IndexAccess { array, index } => {
            format!("{}[{}]", expression(array), expression(index))
        }
        Node::DotFunctionCall {
            object,
            function_call,
        } => format!("{}.{}", expression(object), call_text(function_call)),
        Node::BinOpExpression {
            operator,
            left,
            right,
        } => format!("{} {} {}", expression(left), operator, expression(right)),
        Node::Array { items } => format!(
            "[{}]",
            items.iter().map(expression).collect::<Vec<_>>().join(", ")
        ),
        Node::Object { entries } => {
            if entries.is_empty() {
                "{}".to_string()
            } else {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{}: {}", object_key(&e.key), expression(&e.value)))
                    .collect();
                format!("{{ {} }}", entries.join(", "))
            }
        }
        Node::Await { expression: inner } => format!("await {}", expression(inner)),
        statement => serialize_node(statement),
    }
}

fn call_text(call: &FunctionCall) -> String {
    format!(
        "{}({})",
        call.function_name,
        call.arguments
            .iter()
            .map(expression)
            .collect::<Vec<_>>()
            .join(", ")
    )
}

fn object_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_ident = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_') && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if is_ident {
        key.to_string()
    } else {
        format!("\"{}\"", key)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    Double,
    Triple,
    Backtick,
}

fn escape_segments(segments: &[PromptSegment], quote: Quote) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            PromptSegment::Text { value } => escape_text(value, quote),
            PromptSegment::Interpolation { variable_name } => format!("${{{}}}", variable_name),
        })
        .collect()
}

fn escape_text(text: &str, quote: Quote) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' if quote != Quote::Backtick => out.push_str("\\\""),
            '`' if quote == Quote::Backtick => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\n' if quote == Quote::Double => out.push_str("\\n"),
            '\t' if quote == Quote::Double => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        let program = parse(source).unwrap();
        assert_eq!(parse(&serialize(&program)).unwrap(), program);
        let formatted = serialize_with(&program, &FormatOptions::indented());
        let reparsed = parse(&formatted).unwrap();
        assert_eq!(program, reparsed, "round-trip changed the tree:\n{}", formatted);
        formatted
    }

    #[test]
    fn test_canonical_layout_is_flush() {
        let program = parse("def add(x: number, y) { x }").unwrap();
        assert_eq!(serialize(&program), "def add(x: number, y) {\nx\n}");

        let program = parse("node main() {\n  if (a) {\n    b()\n  }\n}\n").unwrap();
        assert_eq!(serialize(&program), "node main() {\nif (a) {\nb()\n}\n}");
    }

    #[test]
    fn test_function_layout() {
        assert_eq!(
            roundtrip("def add(x: number, y) { x }"),
            "def add(x: number, y) {\n  x\n}\n"
        );
    }

    #[test]
    fn test_if_else_layout() {
        assert_eq!(
            roundtrip("if (a == 1) { b() } else if (c) { d() } else { e() }"),
            "if (a == 1) {\n  b()\n} else if (c) {\n  d()\n} else {\n  e()\n}\n"
        );
    }

    #[test]
    fn test_match_layout() {
        assert_eq!(
            roundtrip("match(x) { 1 => a(), _ => return b }"),
            "match(x) {\n  1 => a()\n  _ => return b\n}\n"
        );
    }

    #[test]
    fn test_string_escapes_roundtrip() {
        roundtrip("s = \"quote \\\" slash \\\\ dollar \\${x} tab\\t\"\n");
        roundtrip("p = `tick \\` and ${name}`\n");
        roundtrip("m = \"\"\"has \"quotes\" inside\nand lines\"\"\"\n");
    }

    #[test]
    fn test_format_nested_union() {
        let ty = VariableType::union(vec![
            VariableType::primitive("number"),
            VariableType::union(vec![
                VariableType::primitive("string"),
                VariableType::primitive("boolean"),
            ]),
        ]);
        assert_eq!(format_type(&ty), "number | (string | boolean)");
    }

    #[test]
    fn test_object_key_quoting() {
        assert_eq!(
            roundtrip("o = { name: 1, \"full name\": 2 }"),
            "o = { name: 1, \"full name\": 2 }\n"
        );
    }

    #[test]
    fn test_empty_bodies() {
        assert_eq!(roundtrip("def f() {}\n"), "def f() {}\n");
        assert_eq!(roundtrip("while (x) {\n}\n"), "while (x) {}\n");
    }

    #[test]
    fn test_canonical_keeps_trailing_blank_line() {
        let program = parse("a = 1\n\n").unwrap();
        let formatted = serialize(&program);
        assert_eq!(parse(&formatted).unwrap(), program);
    }

    #[test]
    fn test_blank_lines_preserved() {
        assert_eq!(
            roundtrip("a = 1\n\n\nb = 2\n"),
            "a = 1\n\n\nb = 2\n"
        );
    }
}

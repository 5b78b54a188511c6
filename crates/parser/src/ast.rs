//! Abstract Syntax Tree types for Agency.
//!
//! This module defines every type representing a parsed Agency program.
//! The tree is a closed tagged union: each [`Node`] serializes with a `type`
//! discriminator in camelCase, so the JSON form of `x = 5` is
//!
//! ```json
//! {"type":"assignment","variableName":"x","value":{"type":"number","value":"5"}}
//! ```
//!
//! # AST Structure
//!
//! ```text
//! Program
//! └── nodes: Vec<Node>
//!     ├── literals        number, string, multiLineString, boolean, variableName, prompt
//!     ├── expressions     functionCall, dotProperty, indexAccess, dotFunctionCall,
//!     │                   binOpExpression, array, object, await
//!     ├── statements      assignment, return, ifElse, whileLoop, matchBlock, timeBlock,
//!     │                   specialVar, comment, multiLineComment, import*, usesTool,
//!     │                   typeHint, typeAlias, newLine
//!     └── definitions     function, graphNode
//! ```
//!
//! Nodes are plain values. Passes that annotate the tree (async flags, tool
//! lists) work on a clone so the parser output can be reused.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A span in the source code represented as byte offsets.
pub type Span = Range<usize>;

// ============================================================================
// Program
// ============================================================================

/// A complete parsed Agency program.
///
/// Top-level order matters: type aliases and variables are resolved in
/// declaration order.
///
/// # Example
///
/// ```rust
/// use agency_parser::parse;
///
/// let program = parse("x = 5\n").unwrap();
/// assert_eq!(program.nodes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    /// Top-level nodes in source order.
    pub nodes: Vec<Node>,
}

impl Program {
    /// Create a program from a list of top-level nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Iterate over the top-level function definitions.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Function(def) => Some(def),
            _ => None,
        })
    }

    /// Iterate over the top-level graph-node definitions.
    pub fn graph_nodes(&self) -> impl Iterator<Item = &GraphNodeDefinition> {
        self.nodes.iter().filter_map(|node| match node {
            Node::GraphNode(def) => Some(def),
            _ => None,
        })
    }

    /// Look up a function definition by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions().find(|def| def.function_name == name)
    }

    /// Look up a graph-node definition by name.
    pub fn graph_node(&self, name: &str) -> Option<&GraphNodeDefinition> {
        self.graph_nodes().find(|def| def.node_name == name)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A node of the Agency syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Node {
    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------
    /// Number literal, kept as its source text (`"5"`, `"-1.5"`).
    Number { value: String },

    /// Double-quoted string with interpolation segments.
    String { segments: Vec<PromptSegment> },

    /// Triple-quoted string with interpolation segments.
    MultiLineString { segments: Vec<PromptSegment> },

    /// `true` or `false`.
    Boolean { value: bool },

    /// A variable reference.
    VariableName { value: String },

    /// Backtick-delimited LLM prompt.
    Prompt(PromptLiteral),

    // ------------------------------------------------------------------
    // Compound expressions
    // ------------------------------------------------------------------
    /// `name(args)`.
    FunctionCall(FunctionCall),

    /// `object.propertyName`.
    DotProperty {
        object: Box<Node>,
        property_name: String,
    },

    /// `array[index]`.
    IndexAccess { array: Box<Node>, index: Box<Node> },

    /// `object.method(args)`.
    DotFunctionCall {
        object: Box<Node>,
        function_call: FunctionCall,
    },

    /// `left <op> right` (a single operator; chains are not part of the grammar).
    BinOpExpression {
        operator: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `[a, b, c]`.
    Array { items: Vec<Node> },

    /// `{ key: value, ... }`.
    Object { entries: Vec<ObjectEntry> },

    /// `await expr`.
    Await { expression: Box<Node> },

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------
    /// `name = value` or `name: Type = value`.
    Assignment {
        variable_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_hint: Option<VariableType>,
        value: Box<Node>,
    },

    /// `return` or `return value`.
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Box<Node>>,
    },

    /// `if (cond) { ... } else { ... }`.
    IfElse {
        condition: Box<Node>,
        then_body: Vec<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_body: Option<Vec<Node>>,
    },

    /// `while (cond) { ... }`.
    WhileLoop { condition: Box<Node>, body: Vec<Node> },

    /// `match(expr) { pattern => body ... }`.
    MatchBlock {
        expression: Box<Node>,
        cases: Vec<MatchCase>,
    },

    /// `time { ... }`.
    TimeBlock { body: Vec<Node> },

    /// `@name = value`.
    SpecialVar { name: String, value: Box<Node> },

    /// `// text` (content excludes the slashes).
    Comment { content: String },

    /// `/* text */` (content excludes the delimiters).
    MultiLineComment { content: String },

    /// `import <clause> from "path"` passed through to the target language.
    ImportStatement {
        import_clause: String,
        module_path: String,
    },

    /// `import node { a, b } from "file.agency"`.
    ImportNodeStatement {
        node_names: Vec<String>,
        module_path: String,
    },

    /// `import tool { a, b } from "file.agency"`.
    ImportToolStatement {
        tool_names: Vec<String>,
        module_path: String,
    },

    /// `+toolA, toolB`: attaches tools to the next prompt. Compile-time only.
    UsesTool { tool_names: Vec<String> },

    /// `name :: Type`.
    TypeHint {
        variable_name: String,
        variable_type: VariableType,
    },

    /// `type Name = Type`.
    TypeAlias {
        alias_name: String,
        aliased_type: VariableType,
    },

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------
    /// `def name(params) { body }`.
    Function(FunctionDefinition),

    /// `node name(params) { body }`.
    GraphNode(GraphNodeDefinition),

    /// A blank source line, kept so formatting preserves vertical spacing.
    NewLine,
}

impl Node {
    /// The serialized `type` tag of this node.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Number { .. } => "number",
            Node::String { .. } => "string",
            Node::MultiLineString { .. } => "multiLineString",
            Node::Boolean { .. } => "boolean",
            Node::VariableName { .. } => "variableName",
            Node::Prompt(_) => "prompt",
            Node::FunctionCall(_) => "functionCall",
            Node::DotProperty { .. } => "dotProperty",
            Node::IndexAccess { .. } => "indexAccess",
            Node::DotFunctionCall { .. } => "dotFunctionCall",
            Node::BinOpExpression { .. } => "binOpExpression",
            Node::Array { .. } => "array",
            Node::Object { .. } => "object",
            Node::Await { .. } => "await",
            Node::Assignment { .. } => "assignment",
            Node::Return { .. } => "return",
            Node::IfElse { .. } => "ifElse",
            Node::WhileLoop { .. } => "whileLoop",
            Node::MatchBlock { .. } => "matchBlock",
            Node::TimeBlock { .. } => "timeBlock",
            Node::SpecialVar { .. } => "specialVar",
            Node::Comment { .. } => "comment",
            Node::MultiLineComment { .. } => "multiLineComment",
            Node::ImportStatement { .. } => "importStatement",
            Node::ImportNodeStatement { .. } => "importNodeStatement",
            Node::ImportToolStatement { .. } => "importToolStatement",
            Node::UsesTool { .. } => "usesTool",
            Node::TypeHint { .. } => "typeHint",
            Node::TypeAlias { .. } => "typeAlias",
            Node::Function(_) => "function",
            Node::GraphNode(_) => "graphNode",
            Node::NewLine => "newLine",
        }
    }

    /// Shorthand for a variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Node::VariableName { value: name.into() }
    }

    /// Shorthand for a number literal.
    pub fn number(value: impl Into<String>) -> Self {
        Node::Number {
            value: value.into(),
        }
    }

    /// Shorthand for a plain string literal without interpolation.
    pub fn string(value: impl Into<String>) -> Self {
        Node::String {
            segments: vec![PromptSegment::Text {
                value: value.into(),
            }],
        }
    }

    /// True for nodes that carry no runtime behavior (comments, blank lines,
    /// compile-time markers and type declarations).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Node::Comment { .. }
                | Node::MultiLineComment { .. }
                | Node::NewLine
                | Node::UsesTool { .. }
                | Node::TypeHint { .. }
                | Node::TypeAlias { .. }
        )
    }

    /// Direct child nodes in source order.
    ///
    /// Covers nested expressions and nested bodies alike. Match-case bodies and
    /// patterns are included.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Number { .. }
            | Node::String { .. }
            | Node::MultiLineString { .. }
            | Node::Boolean { .. }
            | Node::VariableName { .. }
            | Node::Prompt(_)
            | Node::Comment { .. }
            | Node::MultiLineComment { .. }
            | Node::ImportStatement { .. }
            | Node::ImportNodeStatement { .. }
            | Node::ImportToolStatement { .. }
            | Node::UsesTool { .. }
            | Node::TypeHint { .. }
            | Node::TypeAlias { .. }
            | Node::NewLine => Vec::new(),
            Node::FunctionCall(call) => call.arguments.iter().collect(),
            Node::DotProperty { object, .. } => vec![object.as_ref()],
            Node::IndexAccess { array, index } => vec![array.as_ref(), index.as_ref()],
            Node::DotFunctionCall {
                object,
                function_call,
            } => std::iter::once(object.as_ref())
                .chain(function_call.arguments.iter())
                .collect(),
            Node::BinOpExpression { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::Array { items } => items.iter().collect(),
            Node::Object { entries } => entries.iter().map(|e| &e.value).collect(),
            Node::Await { expression } => vec![expression.as_ref()],
            Node::Assignment { value, .. } => vec![value.as_ref()],
            Node::Return { value } => value.iter().map(|v| v.as_ref()).collect(),
            Node::IfElse {
                condition,
                then_body,
                else_body,
            } => std::iter::once(condition.as_ref())
                .chain(then_body.iter())
                .chain(else_body.iter().flatten())
                .collect(),
            Node::WhileLoop { condition, body } => std::iter::once(condition.as_ref())
                .chain(body.iter())
                .collect(),
            Node::MatchBlock { expression, cases } => {
                let mut children = vec![expression.as_ref()];
                for case in cases {
                    if let MatchPattern::Literal(pattern) = &case.pattern {
                        children.push(pattern);
                    }
                    children.push(case.body.as_ref());
                }
                children
            }
            Node::TimeBlock { body } => body.iter().collect(),
            Node::SpecialVar { value, .. } => vec![value.as_ref()],
            Node::Function(def) => def.body.iter().collect(),
            Node::GraphNode(def) => def.body.iter().collect(),
        }
    }

    /// Mutable counterpart of [`Node::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Number { .. }
            | Node::String { .. }
            | Node::MultiLineString { .. }
            | Node::Boolean { .. }
            | Node::VariableName { .. }
            | Node::Prompt(_)
            | Node::Comment { .. }
            | Node::MultiLineComment { .. }
            | Node::ImportStatement { .. }
            | Node::ImportNodeStatement { .. }
            | Node::ImportToolStatement { .. }
            | Node::UsesTool { .. }
            | Node::TypeHint { .. }
            | Node::TypeAlias { .. }
            | Node::NewLine => Vec::new(),
            Node::FunctionCall(call) => call.arguments.iter_mut().collect(),
            Node::DotProperty { object, .. } => vec![object.as_mut()],
            Node::IndexAccess { array, index } => vec![array.as_mut(), index.as_mut()],
            Node::DotFunctionCall {
                object,
                function_call,
            } => std::iter::once(object.as_mut())
                .chain(function_call.arguments.iter_mut())
                .collect(),
            Node::BinOpExpression { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Node::Array { items } => items.iter_mut().collect(),
            Node::Object { entries } => entries.iter_mut().map(|e| &mut e.value).collect(),
            Node::Await { expression } => vec![expression.as_mut()],
            Node::Assignment { value, .. } => vec![value.as_mut()],
            Node::Return { value } => value.iter_mut().map(|v| v.as_mut()).collect(),
            Node::IfElse {
                condition,
                then_body,
                else_body,
            } => std::iter::once(condition.as_mut())
                .chain(then_body.iter_mut())
                .chain(else_body.iter_mut().flatten())
                .collect(),
            Node::WhileLoop { condition, body } => std::iter::once(condition.as_mut())
                .chain(body.iter_mut())
                .collect(),
            Node::MatchBlock { expression, cases } => {
                let mut children = vec![expression.as_mut()];
                for case in cases.iter_mut() {
                    if let MatchPattern::Literal(pattern) = &mut case.pattern {
                        children.push(pattern);
                    }
                    children.push(case.body.as_mut());
                }
                children
            }
            Node::TimeBlock { body } => body.iter_mut().collect(),
            Node::SpecialVar { value, .. } => vec![value.as_mut()],
            Node::Function(def) => def.body.iter_mut().collect(),
            Node::GraphNode(def) => def.body.iter_mut().collect(),
        }
    }

    /// Statement bodies directly owned by this node (not expressions).
    pub fn bodies_mut(&mut self) -> Vec<&mut Vec<Node>> {
        match self {
            Node::IfElse {
                then_body,
                else_body,
                ..
            } => {
                let mut bodies = vec![then_body];
                if let Some(else_body) = else_body {
                    bodies.push(else_body);
                }
                bodies
            }
            Node::WhileLoop { body, .. } | Node::TimeBlock { body } => vec![body],
            Node::Function(def) => vec![&mut def.body],
            Node::GraphNode(def) => vec![&mut def.body],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Literal payloads
// ============================================================================

/// One segment of a string or prompt literal.
///
/// `"hi ${name}!"` becomes `[Text("hi "), Interpolation("name"), Text("!")]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PromptSegment {
    /// Literal text.
    Text { value: String },
    /// `${variableName}`.
    Interpolation { variable_name: String },
}

/// Collect the interpolated variable names of a segment list, in order.
pub fn interpolated_variables(segments: &[PromptSegment]) -> Vec<&str> {
    segments
        .iter()
        .filter_map(|segment| match segment {
            PromptSegment::Interpolation { variable_name } => Some(variable_name.as_str()),
            PromptSegment::Text { .. } => None,
        })
        .collect()
}

/// A backtick prompt sent to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptLiteral {
    pub segments: Vec<PromptSegment>,

    /// Tools attached by preceding `+tool` markers (filled by the preprocessor).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,

    /// Written as `stream \`...\``.
    #[serde(default)]
    pub is_streaming: bool,

    /// Resolved by the preprocessor; `None` until then.
    #[serde(rename = "async", default, skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
}

/// A call `name(arguments)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub function_name: String,
    pub arguments: Vec<Node>,

    /// Resolved by the preprocessor; `None` until then.
    #[serde(rename = "async", default, skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
}

impl FunctionCall {
    pub fn new(function_name: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self {
            function_name: function_name.into(),
            arguments,
            is_async: None,
        }
    }
}

/// A `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Node,
}

/// One arm of a match block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: MatchPattern,
    pub body: Box<Node>,
}

/// The left-hand side of a match arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPattern {
    /// A literal value compared for equality.
    Literal(Node),
    /// `_`: matches anything.
    Default,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
}

impl BinOp {
    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    /// Comparison operators produce booleans.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// A parameter of a function or graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<VariableType>,
}

impl FunctionParameter {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_hint: VariableType) -> Self {
        Self {
            name: name.into(),
            type_hint: Some(type_hint),
        }
    }
}

/// `def name(params): ReturnType { body }`.
///
/// # Agency Syntax
///
/// ```text
/// def add(x: number, y: number): number {
///   """Adds two numbers."""
///   return x + y
/// }
/// ```
///
/// The `async` flag is tri-state: `async def` and `sync def` set it
/// explicitly, a bare `def` leaves it for the preprocessor to infer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub function_name: String,
    pub parameters: Vec<FunctionParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<VariableType>,
    pub body: Vec<Node>,
    #[serde(rename = "async", default, skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    /// Leading `"""..."""` line of the body; used as the tool description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

/// `node name(params) { body }`: a unit of the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNodeDefinition {
    pub node_name: String,
    pub parameters: Vec<FunctionParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<VariableType>,
    pub body: Vec<Node>,
}

// ============================================================================
// Types
// ============================================================================

/// Names that are primitive types rather than alias references.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "number",
    "string",
    "boolean",
    "any",
    "null",
    "undefined",
    "void",
    "object",
];

/// A type annotation.
///
/// # Agency Syntax
///
/// | Syntax | Variant |
/// |--------|---------|
/// | `number` | `Primitive` |
/// | `string[]` | `Array` |
/// | `"a"`, `1`, `true` | `StringLiteral` / `NumberLiteral` / `BooleanLiteral` |
/// | `A \| B` | `Union` |
/// | `{ x: number; y: number }` | `Object` |
/// | `Coords` | `TypeAliasVariable` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum VariableType {
    Primitive { value: String },
    Array { element_type: Box<VariableType> },
    StringLiteral { value: String },
    NumberLiteral { value: String },
    BooleanLiteral { value: bool },
    Union { types: Vec<VariableType> },
    Object { properties: Vec<ObjectProperty> },
    TypeAliasVariable { alias_name: String },
}

impl VariableType {
    /// Build a primitive type.
    ///
    /// ```rust
    /// use agency_parser::VariableType;
    ///
    /// assert!(VariableType::primitive("any").is_any());
    /// assert!(!VariableType::primitive("number").is_any());
    /// ```
    pub fn primitive(name: impl Into<String>) -> Self {
        VariableType::Primitive { value: name.into() }
    }

    pub fn any() -> Self {
        Self::primitive("any")
    }

    pub fn array(element: VariableType) -> Self {
        VariableType::Array {
            element_type: Box::new(element),
        }
    }

    pub fn union(types: Vec<VariableType>) -> Self {
        VariableType::Union { types }
    }

    pub fn alias(name: impl Into<String>) -> Self {
        VariableType::TypeAliasVariable {
            alias_name: name.into(),
        }
    }

    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, VariableType)>) -> Self {
        VariableType::Object {
            properties: properties
                .into_iter()
                .map(|(key, value)| ObjectProperty {
                    key: key.into(),
                    value,
                })
                .collect(),
        }
    }

    /// A primitive name or an alias reference, depending on the word.
    pub fn from_name(name: &str) -> Self {
        if PRIMITIVE_TYPES.contains(&name) {
            Self::primitive(name)
        } else {
            Self::alias(name)
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, VariableType::Primitive { value } if value == "any")
    }

    /// `null`, `undefined` and `void` mean "no value" for return checks.
    pub fn is_empty_type(&self) -> bool {
        matches!(self, VariableType::Primitive { value } if matches!(value.as_str(), "null" | "undefined" | "void"))
    }
}

/// A property of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: VariableType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_json_shape() {
        let node = Node::Assignment {
            variable_name: "x".to_string(),
            type_hint: None,
            value: Box::new(Node::number("5")),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "assignment",
                "variableName": "x",
                "value": { "type": "number", "value": "5" }
            })
        );
    }

    #[test]
    fn test_function_call_async_field_name() {
        let mut call = FunctionCall::new("f", vec![]);
        call.is_async = Some(true);
        let json = serde_json::to_value(Node::FunctionCall(call)).unwrap();
        assert_eq!(json["type"], "functionCall");
        assert_eq!(json["functionName"], "f");
        assert_eq!(json["async"], true);
    }

    #[test]
    fn test_type_json_roundtrip() {
        let ty = VariableType::union(vec![
            VariableType::array(VariableType::primitive("string")),
            VariableType::alias("Coords"),
        ]);
        let json = serde_json::to_string(&ty).unwrap();
        let back: VariableType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(VariableType::from_name("number"), VariableType::primitive("number"));
        assert_eq!(VariableType::from_name("Coords"), VariableType::alias("Coords"));
    }

    #[test]
    fn test_children_cover_match_arms() {
        let node = Node::MatchBlock {
            expression: Box::new(Node::variable("x")),
            cases: vec![
                MatchCase {
                    pattern: MatchPattern::Literal(Node::number("1")),
                    body: Box::new(Node::variable("a")),
                },
                MatchCase {
                    pattern: MatchPattern::Default,
                    body: Box::new(Node::variable("b")),
                },
            ],
        };
        assert_eq!(node.children().len(), 4);
    }
}

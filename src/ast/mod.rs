//! AST module for Twig + HTML + Vue templates
//!
//! This module provides the normalized Abstract Syntax Tree types produced by
//! [`crate::Normalizer`]. Every node optionally carries the source location it
//! was derived from; every node is owned by exactly one parent.
//!
//! The serialized shape (via `serde`) tags each node with a `type` field, e.g.
//! `{"type": "html_element", "name": "p", "children": [...], "loc": {...}}`.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

mod walk;

pub use walk::Descendants;

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// A point in the source text. `line` is 1-based, `column` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Start and end of a node in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    /// Returns true if `other` lies entirely inside this location.
    pub fn contains(&self, other: &Location) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Root of a normalized template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "template")]
pub struct Template {
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// A single node of the normalized tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    #[serde(rename = "content")]
    Content(Content),
    #[serde(rename = "html_element")]
    Element(Element),
    #[serde(rename = "html_named_entity")]
    NamedEntity(Entity),
    #[serde(rename = "html_numeric_entity")]
    NumericEntity(Entity),
    #[serde(rename = "twig_comment")]
    Comment(Comment),
    #[serde(rename = "vue_interpolation")]
    Interpolation(Interpolation),
    #[serde(rename = "doctype")]
    Doctype(Doctype),
    #[serde(rename = "twig_statement_directive")]
    Directive(Directive),
}

/// Raw text between markup, entities, interpolations and directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// An HTML character reference such as `&nbsp;` or `&#xA0;`, delimiters included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// A `{# ... #}` comment; `content` is the trimmed text between the delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// A `{{ ... }}` interpolation. The expression is kept as trimmed, unparsed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolation {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctype {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// An HTML element with its own child scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Set for self-closing tags (`<input />`) and void tags (`<br>`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub void: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// `name="value"`, `name=value`, or a bare `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "html_attribute")]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

// ============================================================================
// DIRECTIVES
// ============================================================================

/// A `{% ... %}` statement directive.
///
/// The payload is a closed variant: a block and an if-condition own children,
/// a function call is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    #[serde(flatten)]
    pub kind: DirectiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveKind {
    /// `{% block name %} ... {% endblock %}`
    Block {
        tag: Tag,
        variable: Variable,
        children: Vec<Node>,
    },
    /// `{% if expr %} ... {% endif %}`
    If {
        condition: Condition,
        children: Vec<Node>,
    },
    /// `{% name(...) %}`, e.g. `{% parent() %}`
    FunctionCall { function: Function },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "twig_tag")]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "twig_variable")]
pub struct Variable {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "twig_condition")]
pub struct Condition {
    pub expression: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "twig_expression")]
pub struct Expression {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "twig_function")]
pub struct Function {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Template {
    /// Depth-first, document-order traversal of every node below the root.
    ///
    /// Yields `(depth, node)` where top-level nodes have depth 0.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children)
    }
}

impl Node {
    /// The serialized `type` tag of this node.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Content(_) => "content",
            Node::Element(_) => "html_element",
            Node::NamedEntity(_) => "html_named_entity",
            Node::NumericEntity(_) => "html_numeric_entity",
            Node::Comment(_) => "twig_comment",
            Node::Interpolation(_) => "vue_interpolation",
            Node::Doctype(_) => "doctype",
            Node::Directive(_) => "twig_statement_directive",
        }
    }

    pub fn loc(&self) -> Option<Location> {
        match self {
            Node::Content(Content { loc, .. })
            | Node::NamedEntity(Entity { loc, .. })
            | Node::NumericEntity(Entity { loc, .. })
            | Node::Comment(Comment { loc, .. })
            | Node::Interpolation(Interpolation { loc, .. })
            | Node::Doctype(Doctype { loc })
            | Node::Element(Element { loc, .. })
            | Node::Directive(Directive { loc, .. }) => *loc,
        }
    }

    /// Child nodes of elements, blocks and if-directives; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Directive(directive) => directive.children(),
            _ => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Node::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    /// Text of content, entity and comment leaves.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Content(Content { content, .. })
            | Node::NamedEntity(Entity { content, .. })
            | Node::NumericEntity(Entity { content, .. })
            | Node::Comment(Comment { content, .. }) => Some(content),
            _ => None,
        }
    }
}

impl Directive {
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            DirectiveKind::Block { children, .. } | DirectiveKind::If { children, .. } => children,
            DirectiveKind::FunctionCall { .. } => &[],
        }
    }

    /// The block name, if this is a `{% block %}` directive.
    pub fn block_name(&self) -> Option<&str> {
        match &self.kind {
            DirectiveKind::Block { variable, .. } => Some(&variable.content),
            _ => None,
        }
    }
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(line: usize, start: usize, end: usize) -> Option<Location> {
        Some(Location {
            start: Position { line, column: start },
            end: Position { line, column: end },
        })
    }

    #[test]
    fn test_void_flag_omitted_when_false() {
        let element = Node::Element(Element {
            name: "p".into(),
            attributes: vec![],
            children: vec![],
            void: false,
            loc: None,
        });
        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value, json!({"type": "html_element", "name": "p", "children": []}));
    }

    #[test]
    fn test_function_call_has_no_children_field() {
        let node = Node::Directive(Directive {
            kind: DirectiveKind::FunctionCall {
                function: Function {
                    name: "parent".into(),
                    loc: at(1, 3, 9),
                },
            },
            loc: at(1, 0, 14),
        });
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "twig_statement_directive");
        assert_eq!(value["function"]["type"], "twig_function");
        assert_eq!(value["function"]["name"], "parent");
        assert!(value.get("children").is_none());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_block_serializes_tag_and_variable() {
        let node = Node::Directive(Directive {
            kind: DirectiveKind::Block {
                tag: Tag {
                    name: "block".into(),
                    loc: None,
                },
                variable: Variable {
                    content: "my_block".into(),
                    loc: None,
                },
                children: vec![],
            },
            loc: None,
        });
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "twig_statement_directive",
                "tag": {"type": "twig_tag", "name": "block"},
                "variable": {"type": "twig_variable", "content": "my_block"},
                "children": []
            })
        );
    }

    #[test]
    fn test_if_directive_reads_back_from_json() {
        let value = json!({
            "type": "twig_statement_directive",
            "condition": {
                "type": "twig_condition",
                "expression": {"type": "twig_expression", "content": "VUE3"}
            },
            "children": [{"type": "content", "content": "Some Content"}]
        });
        let node: Node = serde_json::from_value(value).unwrap();
        let directive = node.as_directive().unwrap();
        assert!(matches!(
            &directive.kind,
            DirectiveKind::If { condition, .. } if condition.expression.content == "VUE3"
        ));
        assert_eq!(node.children()[0].text(), Some("Some Content"));
    }

    #[test]
    fn test_location_contains() {
        let outer = at(1, 0, 20).unwrap();
        let inner = at(1, 4, 9).unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }
}

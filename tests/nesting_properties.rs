//! Property-based tests for the normalizer.
//!
//! Random block/if/element trees are rendered to template source and parsed
//! back; the nesting of the result must mirror the generated tree. Arbitrary
//! input must always produce a template.

use proptest::prelude::*;
use twig_ast::ast::DirectiveKind;
use twig_ast::{parse, Node, Normalizer};

#[derive(Debug, Clone)]
enum Item {
    Text(String),
    Block(String, Vec<Item>),
    If(String, Vec<Item>),
    Element(&'static str, Vec<Item>),
}

/// Comparable view of a node; adjacent texts are joined the way the grammar
/// joins them into one content run.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Text(String),
    Block(String, Vec<Shape>),
    If(String, Vec<Shape>),
    Element(String, Vec<Shape>),
    Other(&'static str),
}

fn item() -> impl Strategy<Value = Item> {
    let leaf = "[a-z]{1,8}".prop_map(Item::Text);
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            ("[a-z_][a-z0-9_]{0,7}", prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(name, children)| Item::Block(name, children)),
            ("[a-z]{1,6}", prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(expr, children)| Item::If(expr, children)),
            (
                prop_oneof![Just("div"), Just("p"), Just("span"), Just("sw-card")],
                prop::collection::vec(inner, 0..4)
            )
                .prop_map(|(tag, children)| Item::Element(tag, children)),
        ]
    })
}

fn render(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| match item {
            Item::Text(text) => text.clone(),
            Item::Block(name, children) => {
                format!("{{% block {name} %}} {} {{% endblock %}}", render(children))
            }
            Item::If(expr, children) => format!("{{% if {expr} %}} {} {{% endif %}}", render(children)),
            Item::Element(tag, children) => format!("<{tag}> {} </{tag}>", render(children)),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn expected(items: &[Item]) -> Vec<Shape> {
    let mut shapes: Vec<Shape> = Vec::new();
    for item in items {
        let shape = match item {
            Item::Text(text) => {
                if let Some(Shape::Text(previous)) = shapes.last_mut() {
                    previous.push(' ');
                    previous.push_str(text);
                    continue;
                }
                Shape::Text(text.clone())
            }
            Item::Block(name, children) => Shape::Block(name.clone(), expected(children)),
            Item::If(expr, children) => Shape::If(expr.clone(), expected(children)),
            Item::Element(tag, children) => Shape::Element(tag.to_string(), expected(children)),
        };
        shapes.push(shape);
    }
    shapes
}

fn shapes(nodes: &[Node]) -> Vec<Shape> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Content(content) => Shape::Text(content.content.clone()),
            Node::Element(element) => Shape::Element(element.name.clone(), shapes(&element.children)),
            Node::Directive(directive) => match &directive.kind {
                DirectiveKind::Block { variable, children, .. } => {
                    Shape::Block(variable.content.clone(), shapes(children))
                }
                DirectiveKind::If { condition, children } => {
                    Shape::If(condition.expression.content.clone(), shapes(children))
                }
                DirectiveKind::FunctionCall { .. } => Shape::Other("function"),
            },
            other => Shape::Other(other.type_name()),
        })
        .collect()
}

/// Fragments that exercise every construct, including broken ones.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "text", " ", "\n", "<div>", "</div>", "<p class=\"a\">", "</p>", "<br>", "<img/>", "</span>",
        "{% block b %}", "{% endblock %}", "{% if x %}", "{% endif %}", "{% parent() %}", "{% set a %}",
        "{{ v }}", "{{", "{%", "{#", "{# c #}", "&amp;", "&#160;", "&", "<", "<!-- x -->",
        "<!DOCTYPE html>", "<script>", "</script>", "ä",
    ])
}

proptest! {
    #[test]
    fn nesting_mirrors_generated_tree(items in prop::collection::vec(item(), 0..6)) {
        let source = render(&items);
        let template = parse(&source).unwrap();
        prop_assert_eq!(shapes(&template.children), expected(&items));
    }

    #[test]
    fn orphan_closes_change_nothing(items in prop::collection::vec(item(), 0..4), orphans in 1usize..4) {
        let source = render(&items);
        let prefixed = format!("{}{}", "{% endblock %}{% endif %}".repeat(orphans), source);

        let normalized = Normalizer::default().parse_with_report(&prefixed).unwrap();
        prop_assert_eq!(shapes(&normalized.template.children), expected(&items));
        prop_assert_eq!(normalized.dropped.len(), orphans * 2);
    }

    #[test]
    fn arbitrary_text_always_yields_a_template(source in "\\PC{0,64}") {
        prop_assert!(parse(&source).is_ok());
    }

    #[test]
    fn node_locations_stay_inside_their_parent(parts in prop::collection::vec(fragment(), 0..24)) {
        let source = parts.concat();
        let template = parse(&source).unwrap();
        let root = template.loc.unwrap();

        // a directive's span is its opening marker, so its children are
        // checked against the enclosing element instead
        fn check(parent: twig_ast::ast::Location, nodes: &[Node]) -> bool {
            nodes.iter().all(|node| {
                let loc = node.loc().unwrap();
                let inner = if matches!(node, Node::Element(_)) { loc } else { parent };
                parent.contains(&loc) && loc.start <= loc.end && check(inner, node.children())
            })
        }

        prop_assert!(check(root, &template.children), "a node escapes its parent in {:?}", source);
    }
}

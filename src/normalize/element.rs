//! Element Builder
//!
//! Assembles an [`Element`] from its CST node: name and attributes from the
//! opening tag, and children from a nesting scope of their own. Script and
//! style bodies are kept verbatim as a single content node.

use pest::iterators::Pair;
use tracing::debug;

use super::classify::{child, Event};
use super::Builder;
use crate::ast::{Attribute, Content, Element, Node};
use crate::syntax::Rule;

impl Builder<'_> {
    /// Builds an element. Its children form their own nesting scope.
    pub(crate) fn element(&mut self, pair: Pair<'_, Rule>) -> Event {
        if self.too_deep() {
            return Event::TooDeep {
                kind: pair.as_rule(),
                loc: self.lines.locate(&pair),
            };
        }

        let loc = self.loc(&pair);
        let raw = matches!(pair.as_rule(), Rule::script_element | Rule::style_element);

        let (head, void) = match opening_tag(&pair) {
            Some(found) => found,
            None => {
                return Event::Unrecognized {
                    kind: pair.as_rule(),
                    loc: self.lines.locate(&pair),
                }
            }
        };

        let name = child(&head, Rule::tag_name).map_or_else(String::new, |n| self.text(&n).to_string());
        let attributes = head
            .into_inner()
            .filter(|p| p.as_rule() == Rule::attribute)
            .filter_map(|attr| self.attribute(attr))
            .collect();

        let children = if raw {
            child(&pair, Rule::raw_text)
                .map(|text| {
                    vec![Node::Content(Content {
                        content: self.text(&text).to_string(),
                        loc: self.loc(&text),
                    })]
                })
                .unwrap_or_default()
        } else {
            let body = pair.into_inner().filter(|p| !is_tag(p.as_rule()));
            self.depth += 1;
            let children = self.scope(body);
            self.depth -= 1;
            children
        };

        Event::Node(Node::Element(Element {
            name,
            attributes,
            children,
            void,
            loc,
        }))
    }

    fn attribute(&self, pair: Pair<'_, Rule>) -> Option<Attribute> {
        let Some(name) = child(&pair, Rule::attribute_name) else {
            debug!(text = self.text(&pair), "skipping attribute without a name");
            return None;
        };

        let value = child(&pair, Rule::quoted_attribute_value)
            .and_then(|quoted| child(&quoted, Rule::attribute_value))
            .or_else(|| child(&pair, Rule::unquoted_attribute_value))
            .map(|value| self.text(&value).to_string());

        Some(Attribute {
            name: self.text(&name).to_string(),
            value,
            loc: self.loc(&pair),
        })
    }
}

/// The pair holding the element's name and attributes, and whether the
/// element was written as void.
fn opening_tag<'i>(element: &Pair<'i, Rule>) -> Option<(Pair<'i, Rule>, bool)> {
    if let Some(tag) = child(element, Rule::self_closing_tag) {
        return Some((tag, true));
    }
    if let Some(tag) = child(element, Rule::void_tag) {
        return child(&tag, Rule::start_tag).map(|start| (start, true));
    }
    child(element, Rule::start_tag).map(|start| (start, false))
}

fn is_tag(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::start_tag | Rule::end_tag | Rule::self_closing_tag | Rule::void_tag
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DirectiveKind, Location, Position};
    use crate::normalize::NormalizeOptions;
    use crate::syntax::parse_cst;

    fn build(source: &str) -> Element {
        let options = NormalizeOptions::default();
        let mut builder = Builder::new(&options, source);
        let root = parse_cst(source).unwrap();
        match builder.classify(root.into_inner().next().unwrap()) {
            Event::Node(Node::Element(element)) => element,
            other => panic!("expected element for {source:?}, got {other:?}"),
        }
    }

    fn span(start: usize, end: usize) -> Option<Location> {
        Some(Location {
            start: Position { line: 1, column: start },
            end: Position { line: 1, column: end },
        })
    }

    #[test]
    fn test_element_with_attribute_and_content() {
        let p = build("<p class=\"test\">Hello</p>");
        assert_eq!(p.name, "p");
        assert_eq!(p.loc, span(0, 25));
        assert!(!p.void);

        let class = p.attribute("class").unwrap();
        assert_eq!(class.value.as_deref(), Some("test"));
        assert_eq!(class.loc, span(3, 15));

        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].text(), Some("Hello"));
        assert_eq!(p.children[0].loc(), span(16, 21));
    }

    #[test]
    fn test_attribute_value_forms() {
        let div = build("<div id=main hidden data-x='1' title=\"\"></div>");
        let values: Vec<(&str, Option<&str>)> = div
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_deref()))
            .collect();
        assert_eq!(
            values,
            vec![("id", Some("main")), ("hidden", None), ("data-x", Some("1")), ("title", Some(""))]
        );
    }

    #[test]
    fn test_void_forms() {
        assert!(build("<br>").void);
        assert!(build("<img src=\"a.png\">").void);
        let input = build("<input type=\"text\" />");
        assert!(input.void);
        assert_eq!(input.name, "input");
        assert_eq!(input.attribute("type").unwrap().value.as_deref(), Some("text"));
        assert!(build("<my-widget/>").void);
    }

    #[test]
    fn test_implicitly_closed_element_is_not_void() {
        let div = build("<div><p>text</div>");
        assert!(!div.void);
        let p = div.children[0].as_element().unwrap();
        assert_eq!(p.name, "p");
        assert!(!p.void);
        assert_eq!(p.children[0].text(), Some("text"));
    }

    #[test]
    fn test_script_body_is_one_verbatim_content_node() {
        let script = build("<script>\n  let a = 1 < 2;\n</script>");
        assert_eq!(script.name, "script");
        assert_eq!(script.children.len(), 1);
        assert_eq!(script.children[0].text(), Some("\n  let a = 1 < 2;\n"));

        let style = build("<style></style>");
        assert!(style.children.is_empty());
    }

    #[test]
    fn test_element_children_are_their_own_scope() {
        let div = build("<div>{% block a %}x{% endblock %}y</div>");
        assert_eq!(div.children.len(), 2);
        let block = div.children[0].as_directive().unwrap();
        assert_eq!(block.block_name(), Some("a"));
        assert!(matches!(&block.kind, DirectiveKind::Block { children, .. } if children.len() == 1));
        assert_eq!(div.children[1].text(), Some("y"));
    }

    #[test]
    fn test_name_keeps_source_case() {
        let source = "<Sw-Card Title=\"X\">a</SW-CARD>";
        let folded = crate::syntax::fold_tag_names(source);
        let options = NormalizeOptions::default();
        let mut builder = Builder::new(&options, source);
        let root = parse_cst(&folded).unwrap();
        match builder.classify(root.into_inner().next().unwrap()) {
            Event::Node(Node::Element(card)) => {
                assert_eq!(card.name, "Sw-Card");
                assert_eq!(card.attribute("Title").unwrap().value.as_deref(), Some("X"));
                assert_eq!(card.children[0].text(), Some("a"));
            }
            other => panic!("expected element, got {other:?}"),
        }
    }
}

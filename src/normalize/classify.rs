//! Node Classifier
//!
//! Maps one CST node to exactly one [`Event`]. Dispatch is a closed match on
//! the grammar's `Rule` enum; kinds without a mapping become
//! [`Event::Unrecognized`] so the nesting builder can record what it drops.

use pest::iterators::Pair;
use tracing::trace;

use super::Builder;
use crate::ast::{
    Comment, Condition, Content, Doctype, Entity, Expression, Function, Interpolation, Location,
    Node, Tag, Variable,
};
use crate::syntax::Rule;

/// The classified form of one CST node.
#[derive(Debug)]
pub(crate) enum Event {
    /// A fully built node: content, element, entity, comment, interpolation or doctype.
    Node(Node),
    BlockOpen {
        tag: Tag,
        variable: Variable,
        loc: Option<Location>,
    },
    BlockClose {
        loc: Location,
    },
    IfOpen {
        condition: Condition,
        loc: Option<Location>,
    },
    IfClose {
        loc: Location,
    },
    FunctionCall {
        function: Function,
        loc: Option<Location>,
    },
    /// A block or if opened past the depth limit.
    ElidedOpen {
        loc: Location,
    },
    /// An element past the depth limit, dropped with its subtree.
    TooDeep {
        kind: Rule,
        loc: Location,
    },
    /// A node kind or directive shape with no AST counterpart.
    Unrecognized {
        kind: Rule,
        loc: Location,
    },
}

/// First direct child of `pair` with the given kind.
pub(super) fn child<'i>(pair: &Pair<'i, Rule>, rule: Rule) -> Option<Pair<'i, Rule>> {
    pair.clone().into_inner().find(|p| p.as_rule() == rule)
}

impl Builder<'_> {
    pub(crate) fn classify(&mut self, pair: Pair<'_, Rule>) -> Event {
        trace!(kind = ?pair.as_rule(), text = self.text(&pair), "classifying node");

        match pair.as_rule() {
            Rule::content => Event::Node(Node::Content(Content {
                content: self.text(&pair).to_string(),
                loc: self.loc(&pair),
            })),
            Rule::html_entity => self.entity(&pair),
            Rule::twig_comment => self.comment(&pair),
            Rule::vue_interpolation => self.interpolation(&pair),
            Rule::html_doctype => Event::Node(Node::Doctype(Doctype {
                loc: self.loc(&pair),
            })),
            Rule::html_element | Rule::script_element | Rule::style_element => self.element(pair),
            Rule::statement_directive => self.directive(pair),
            kind => Event::Unrecognized {
                kind,
                loc: self.lines.locate(&pair),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------------

    fn entity(&self, pair: &Pair<'_, Rule>) -> Event {
        let entity = Entity {
            content: self.text(pair).to_string(),
            loc: self.loc(pair),
        };
        if entity.content.starts_with("&#") {
            Event::Node(Node::NumericEntity(entity))
        } else {
            Event::Node(Node::NamedEntity(entity))
        }
    }

    fn comment(&self, pair: &Pair<'_, Rule>) -> Event {
        let text = self.text(pair);
        // strip `{#` and `#}`
        let inner = text.get(2..text.len().saturating_sub(2)).unwrap_or("");
        Event::Node(Node::Comment(Comment {
            content: inner.trim().to_string(),
            loc: self.loc(pair),
        }))
    }

    fn interpolation(&self, pair: &Pair<'_, Rule>) -> Event {
        let expression = child(pair, Rule::interpolation_content).map_or("", |inner| self.text(&inner));
        Event::Node(Node::Interpolation(Interpolation {
            expression: expression.trim().to_string(),
            loc: self.loc(pair),
        }))
    }

    // ------------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------------

    fn directive(&self, pair: Pair<'_, Rule>) -> Event {
        let at = self.lines.locate(&pair);
        let loc = self.options.locations.then_some(at);

        let event = pair
            .into_inner()
            .find_map(|statement| match statement.as_rule() {
                Rule::if_statement => self.if_statement(&statement, loc),
                Rule::tag_statement => self.tag_statement(&statement, loc, at),
                Rule::function_call => self.function_call(&statement, loc),
                _ => None,
            })
            .unwrap_or(Event::Unrecognized {
                kind: Rule::statement_directive,
                loc: at,
            });

        match event {
            Event::BlockOpen { .. } | Event::IfOpen { .. } if self.too_deep() => Event::ElidedOpen { loc: at },
            event => event,
        }
    }

    /// `{% if <expression> %}`; the condition shares the directive's span.
    fn if_statement(&self, statement: &Pair<'_, Rule>, loc: Option<Location>) -> Option<Event> {
        let conditional = child(statement, Rule::conditional)?;
        let expression = child(statement, Rule::expression)?;
        if self.text(&conditional) != "if" {
            return None;
        }
        Some(Event::IfOpen {
            condition: Condition {
                expression: Expression {
                    content: self.text(&expression).trim().to_string(),
                    loc: self.loc(&expression),
                },
                loc,
            },
            loc,
        })
    }

    fn tag_statement(&self, statement: &Pair<'_, Rule>, loc: Option<Location>, at: Location) -> Option<Event> {
        if let Some(conditional) = child(statement, Rule::conditional) {
            return (self.text(&conditional) == "endif").then_some(Event::IfClose { loc: at });
        }

        let tag = child(statement, Rule::tag)?;
        match self.text(&tag) {
            "block" => {
                let variable = child(statement, Rule::variable)?;
                Some(Event::BlockOpen {
                    tag: Tag {
                        name: self.text(&tag).to_string(),
                        loc: self.loc(&tag),
                    },
                    variable: Variable {
                        content: self.text(&variable).to_string(),
                        loc: self.loc(&variable),
                    },
                    loc,
                })
            }
            "endblock" => Some(Event::BlockClose { loc: at }),
            _ => None,
        }
    }

    fn function_call(&self, statement: &Pair<'_, Rule>, loc: Option<Location>) -> Option<Event> {
        let identifier = child(statement, Rule::function_identifier)?;
        Some(Event::FunctionCall {
            function: Function {
                name: self.text(&identifier).to_string(),
                loc: self.loc(&identifier),
            },
            loc,
        })
    }
}

//! Nesting Builder
//!
//! Feeds the events of one scope (the document root or one element's direct
//! children) through a stack of open directives and returns the nested node
//! list for that scope. Each scope owns its own stack, so opens and closes
//! from different scopes never interact.

use tracing::debug;

use super::classify::Event;
use super::{DropReason, Dropped};
use crate::ast::{Condition, Directive, DirectiveKind, Function, Location, Node, Tag, Variable};
use crate::syntax::Rule;

fn function_call(function: Function, loc: Option<Location>) -> Node {
    Node::Directive(Directive {
        kind: DirectiveKind::FunctionCall { function },
        loc,
    })
}

// ============================================================================
// SCOPE STATE
// ============================================================================

/// A directive that has been opened and not yet closed.
struct Open {
    head: Head,
    loc: Option<Location>,
    children: Vec<Node>,
}

enum Head {
    Block { tag: Tag, variable: Variable },
    If { condition: Condition },
    /// An open past the depth limit. It still pairs with a close, but its
    /// children go to the enclosing node.
    Elided,
}

impl Open {
    fn new(head: Head, loc: Option<Location>) -> Self {
        Self {
            head,
            loc,
            children: Vec::new(),
        }
    }

    fn into_nodes(self) -> Vec<Node> {
        let kind = match self.head {
            Head::Block { tag, variable } => DirectiveKind::Block {
                tag,
                variable,
                children: self.children,
            },
            Head::If { condition } => DirectiveKind::If {
                condition,
                children: self.children,
            },
            Head::Elided => return self.children,
        };
        vec![Node::Directive(Directive {
            kind,
            loc: self.loc,
        })]
    }
}

/// `result` plus the stack of open directives. The current target is the
/// innermost open directive's children, or `result` when nothing is open.
///
/// An open directive is attached to its parent when it is popped. While it is
/// on top of the stack nothing else can reach the parent, so document order
/// is the same as attaching it at open time.
#[derive(Default)]
pub(crate) struct Scope {
    result: Vec<Node>,
    stack: Vec<Open>,
    elided: usize,
}

impl Scope {
    /// Open directives that will appear in the tree.
    pub(crate) fn depth(&self) -> usize {
        self.stack.len() - self.elided
    }

    /// Applies one event. Dropped constructs are appended to `dropped`.
    pub(crate) fn push(&mut self, event: Event, dropped: &mut Vec<Dropped>) {
        match event {
            Event::Node(node) => self.append(node),
            Event::BlockOpen { tag, variable, loc } => {
                self.stack.push(Open::new(Head::Block { tag, variable }, loc));
            }
            Event::IfOpen { condition, loc } => {
                self.stack.push(Open::new(Head::If { condition }, loc));
            }
            Event::ElidedOpen { loc } => {
                debug!(?loc, "eliding directive nested past the depth limit");
                self.elided += 1;
                self.stack.push(Open::new(Head::Elided, None));
                dropped.push(Dropped {
                    kind: Rule::statement_directive,
                    reason: DropReason::TooDeep,
                    loc,
                });
            }
            Event::BlockClose { loc } | Event::IfClose { loc } => {
                if !self.close() {
                    debug!(?loc, "ignoring close directive without an open directive");
                    dropped.push(Dropped {
                        kind: Rule::statement_directive,
                        reason: DropReason::OrphanClose,
                        loc,
                    });
                }
            }
            Event::FunctionCall { function, loc } => self.append(function_call(function, loc)),
            Event::TooDeep { kind, loc } => {
                debug!(?kind, ?loc, "dropping node nested past the depth limit");
                dropped.push(Dropped {
                    kind,
                    reason: DropReason::TooDeep,
                    loc,
                });
            }
            Event::Unrecognized { kind, loc } => {
                debug!(?kind, ?loc, "dropping unrecognized node");
                dropped.push(Dropped {
                    kind,
                    reason: DropReason::Unrecognized,
                    loc,
                });
            }
        }
    }

    fn target(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.result,
        }
    }

    fn append(&mut self, node: Node) {
        self.target().push(node);
    }

    /// Pops the innermost open directive; returns false if none was open.
    fn close(&mut self) -> bool {
        match self.stack.pop() {
            Some(open) => {
                if matches!(open.head, Head::Elided) {
                    self.elided -= 1;
                }
                let nodes = open.into_nodes();
                self.target().extend(nodes);
                true
            }
            None => false,
        }
    }

    /// Directives still open at the end of the scope keep what they collected.
    pub(crate) fn finish(mut self) -> Vec<Node> {
        if !self.stack.is_empty() {
            debug!(unclosed = self.stack.len(), "scope ended with open directives");
        }
        while self.close() {}
        self.result
    }
}

use std::slice;

use super::Node;

/// Pre-order iterator over a node list and everything nested below it.
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(nodes: &'a [Node]) -> Self {
        Self {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            match self.stack.last_mut()?.next() {
                Some(node) => {
                    let children = node.children();
                    if !children.is_empty() {
                        self.stack.push(children.iter());
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

//! # Tree Builder
//!
//! Assembles [`Tree`]s from a stream of node events. Tags can open and close
//! across any number of lines at any depth, so nesting is tracked with an
//! explicit stack of open frames rather than by recursion.
//!
//! ## Invariants
//! - Stack depth equals the current nesting depth; an empty stack means no
//!   node is open.
//! - A tree is handed out exactly once, at the moment its root closes.
//! - Null placeholders are recorded in their parent's child list but never
//!   pushed, since they cannot have children.

use thiserror::Error;

use super::{Child, Node, NodeId, Tree};

/// Structural errors in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{0}")]
    Unbalanced(&'static str),
    #[error("a null placeholder cannot have children")]
    NullWithChildren,
}

/// What a node-start event produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    Node(Node),
    Null,
}

/// Stack-based tree assembler.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Handles a node start. A self-closing node with no open parent is a
    /// complete one-node tree and is returned immediately.
    pub fn open(&mut self, spec: NodeSpec, self_closing: bool) -> Result<Option<Tree>, BuildError> {
        let node = match spec {
            NodeSpec::Null if !self_closing => return Err(BuildError::NullWithChildren),
            NodeSpec::Null => {
                if let Some(parent) = self.stack.last().copied() {
                    self.nodes[parent.index()].push_child(Child::Null);
                }
                return Ok(None);
            }
            NodeSpec::Node(node) => node,
        };

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);

        match self.stack.last().copied() {
            Some(parent) => self.nodes[parent.index()].push_child(Child::Node(id)),
            None if self_closing => return Ok(Some(self.take_tree(id))),
            None => {}
        }

        if !self_closing {
            self.stack.push(id);
        }
        Ok(None)
    }

    /// Handles a node end. Returns the finished tree when the root closes.
    pub fn close(&mut self) -> Result<Option<Tree>, BuildError> {
        let popped = self
            .stack
            .pop()
            .ok_or(BuildError::Unbalanced("end tag without an open node"))?;

        if self.stack.is_empty() {
            return Ok(Some(self.take_tree(popped)));
        }
        Ok(None)
    }

    /// Checks that every opened node was closed.
    pub fn finish(&self) -> Result<(), BuildError> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(BuildError::Unbalanced("node left open at end of input"))
        }
    }

    fn take_tree(&mut self, root: NodeId) -> Tree {
        Tree::from_arena(std::mem::take(&mut self.nodes), root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OpCode;

    fn int(n: i64) -> NodeSpec {
        NodeSpec::Node(Node::with_int(OpCode::IntLiteral, n))
    }

    fn op(op: OpCode) -> NodeSpec {
        NodeSpec::Node(Node::new(op))
    }

    #[test]
    fn nested_tree_completes_when_root_closes() {
        let mut b = TreeBuilder::new();
        b.open(op(OpCode::Multiply), false).unwrap();
        b.open(int(2), true).unwrap();
        b.open(op(OpCode::Subtract), false).unwrap();
        b.open(int(5), true).unwrap();
        b.open(int(2), true).unwrap();
        assert_eq!(b.depth(), 2);
        assert_eq!(b.close(), Ok(None));
        let tree = b.close().unwrap().unwrap();

        assert!(b.is_idle());
        assert_eq!(tree.len(), 5);
        let root = tree.root_node();
        assert_eq!(root.op(), OpCode::Multiply);
        assert_eq!(root.children().len(), 2);
        let sub = tree.node(root.children()[1].node().unwrap());
        assert_eq!(sub.op(), OpCode::Subtract);
        assert_eq!(sub.children().len(), 2);
    }

    #[test]
    fn null_placeholder_keeps_its_position() {
        let mut b = TreeBuilder::new();
        b.open(op(OpCode::Concat), false).unwrap();
        b.open(int(1), true).unwrap();
        b.open(NodeSpec::Null, true).unwrap();
        b.open(int(3), true).unwrap();
        let tree = b.close().unwrap().unwrap();

        let children = tree.root_node().children();
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0], Child::Node(_)));
        assert_eq!(children[1], Child::Null);
        assert_eq!(tree.node(children[2].node().unwrap()).int_value(), Some(3));
    }

    #[test]
    fn self_closing_root_is_a_complete_tree() {
        let mut b = TreeBuilder::new();
        let tree = b.open(int(7), true).unwrap().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_node().int_value(), Some(7));
    }

    #[test]
    fn consecutive_trees_do_not_share_an_arena() {
        let mut b = TreeBuilder::new();
        let first = b.open(int(1), true).unwrap().unwrap();
        b.open(op(OpCode::Negate), false).unwrap();
        b.open(int(2), true).unwrap();
        let second = b.close().unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second.root(), NodeId(0));
    }

    #[test]
    fn null_root_produces_nothing() {
        let mut b = TreeBuilder::new();
        assert_eq!(b.open(NodeSpec::Null, true), Ok(None));
        assert!(b.is_idle());
    }

    #[test]
    fn open_null_is_rejected() {
        let mut b = TreeBuilder::new();
        assert_eq!(b.open(NodeSpec::Null, false), Err(BuildError::NullWithChildren));
    }

    #[test]
    fn close_without_open_is_unbalanced() {
        let mut b = TreeBuilder::new();
        assert!(matches!(b.close(), Err(BuildError::Unbalanced(_))));
    }

    #[test]
    fn unclosed_node_fails_finish() {
        let mut b = TreeBuilder::new();
        b.open(op(OpCode::Add), false).unwrap();
        assert!(matches!(b.finish(), Err(BuildError::Unbalanced(_))));
    }
}

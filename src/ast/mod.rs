//! AST module for computation trees
//!
//! A [`Tree`] is an index-addressed arena of [`Node`]s. Children refer to
//! their nodes by [`NodeId`], so a tree owns every node it contains and no
//! node is shared between trees.
//!
//! ## Invariants
//! - Nodes are appended in pre-order: every child has a larger id than its
//!   parent. Iterating ids in reverse is therefore a valid bottom-up walk.
//! - A string payload only ever appears on a string-literal node.
//! - Nodes are never restructured once a tree is complete. Per-node metadata
//!   lives outside the tree, in [`Annotations`].

// ============================================================================
// IMPORTS
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::registry::OpCode;

pub mod builder;
pub mod dump;

pub use builder::{BuildError, NodeSpec, TreeBuilder};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Position of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Literal data carried by a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Int(i64),
    Str(String),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Int(n) => write!(f, "{}", n),
            Payload::Str(s) => f.write_str(s),
        }
    }
}

/// One ordered child slot: a node, or an explicit null placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(NodeId),
    Null,
}

impl Child {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Child::Node(id) => Some(id),
            Child::Null => None,
        }
    }
}

/// `content` text that does not fit the op it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("content '{content}' of {op} is not an integer")]
pub struct ContentError {
    pub op: OpCode,
    pub content: String,
}

/// A computation node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    op: OpCode,
    children: Vec<Child>,
    payload: Option<Payload>,
}

impl Node {
    /// A node without payload.
    pub fn new(op: OpCode) -> Self {
        Self {
            op,
            children: Vec::new(),
            payload: None,
        }
    }

    /// A node with an integer payload.
    pub fn with_int(op: OpCode, value: i64) -> Self {
        Self {
            payload: Some(Payload::Int(value)),
            ..Self::new(op)
        }
    }

    /// A string-literal node.
    pub fn string_literal(value: impl Into<String>) -> Self {
        Self {
            payload: Some(Payload::Str(value.into())),
            ..Self::new(OpCode::StringLiteral)
        }
    }

    /// Types raw `content` text for `op`: verbatim for string literals,
    /// a decimal integer for everything else.
    ///
    /// ```rust
    /// use treecheck::ast::{Node, Payload};
    /// use treecheck::registry::OpCode;
    /// let n = Node::with_content(OpCode::IntLiteral, Some("42")).unwrap();
    /// assert_eq!(n.payload(), Some(&Payload::Int(42)));
    /// assert!(Node::with_content(OpCode::IntLiteral, Some("4x")).is_err());
    /// ```
    pub fn with_content(op: OpCode, content: Option<&str>) -> Result<Self, ContentError> {
        let Some(text) = content else {
            return Ok(Self::new(op));
        };
        if op.is_string_literal() {
            return Ok(Self::string_literal(text));
        }
        text.parse::<i64>()
            .map(|value| Self::with_int(op, value))
            .map_err(|_| ContentError {
                op,
                content: text.to_string(),
            })
    }

    pub fn op(&self) -> OpCode {
        self.op
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn int_value(&self) -> Option<i64> {
        match self.payload {
            Some(Payload::Int(n)) => Some(n),
            _ => None,
        }
    }

    pub fn str_value(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub(crate) fn push_child(&mut self, child: Child) {
        self.children.push(child);
    }
}

/// A complete, rooted computation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub(crate) fn from_arena(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// A tree holding a single node.
    pub fn leaf(node: Node) -> Self {
        Self::from_arena(vec![node], NodeId(0))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[self.root.index()]
    }

    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id, parents before children.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Every node id, children before parents.
    pub fn bottom_up(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().rev()
    }

    /// Same shape, ops and payloads. Ids may differ.
    pub fn same_shape(&self, other: &Tree) -> bool {
        let mut pending = vec![(self.root, other.root)];
        while let Some((ai, bi)) = pending.pop() {
            let (x, y) = (self.node(ai), other.node(bi));
            if x.op != y.op || x.payload != y.payload || x.children.len() != y.children.len() {
                return false;
            }
            for pair in x.children.iter().zip(&y.children) {
                match pair {
                    (Child::Null, Child::Null) => {}
                    (Child::Node(ac), Child::Node(bc)) => pending.push((*ac, *bc)),
                    _ => return false,
                }
            }
        }
        true
    }
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

/// Per-node metadata written by a reducer, kept beside the tree it describes.
///
/// The tree itself never reads this table.
#[derive(Debug, Clone)]
pub struct Annotations<A> {
    slots: HashMap<NodeId, A>,
}

impl<A> Default for Annotations<A> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<A> Annotations<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: NodeId, annotation: A) {
        self.slots.insert(id, annotation);
    }

    pub fn get(&self, id: NodeId) -> Option<&A> {
        self.slots.get(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_tree() -> Tree {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.open(NodeSpec::Node(Node::new(OpCode::Add)), false), Ok(None));
        for n in [1, 2] {
            let leaf = NodeSpec::Node(Node::with_int(OpCode::IntLiteral, n));
            assert_eq!(builder.open(leaf, true), Ok(None));
        }
        builder.close().unwrap().unwrap()
    }

    #[test]
    fn children_follow_their_parent_in_the_arena() {
        let tree = sum_tree();
        assert_eq!(tree.root(), NodeId(0));
        for id in tree.ids() {
            for child in tree.node(id).children().iter().filter_map(|c| c.node()) {
                assert!(child > id);
            }
        }
        let order: Vec<_> = tree.bottom_up().collect();
        assert_eq!(order, vec![NodeId(2), NodeId(1), NodeId(0)]);
    }

    #[test]
    fn content_typing_follows_the_op() {
        let s = Node::with_content(OpCode::StringLiteral, Some("12")).unwrap();
        assert_eq!(s.str_value(), Some("12"));
        let i = Node::with_content(OpCode::ShortLiteral, Some("-7")).unwrap();
        assert_eq!(i.int_value(), Some(-7));
        let none = Node::with_content(OpCode::Add, None).unwrap();
        assert_eq!(none.payload(), None);
        assert_eq!(
            Node::with_content(OpCode::IntLiteral, Some("abc")),
            Err(ContentError {
                op: OpCode::IntLiteral,
                content: "abc".into()
            })
        );
    }

    #[test]
    fn integer_content_allows_no_padding() {
        for text in [" 5", "5 ", "+ 5", ""] {
            assert!(Node::with_content(OpCode::IntLiteral, Some(text)).is_err(), "{:?}", text);
        }
    }

    #[test]
    fn same_shape_ignores_nothing_but_ids() {
        let a = sum_tree();
        let b = sum_tree();
        assert!(a.same_shape(&b));
        let c = Tree::leaf(Node::with_int(OpCode::IntLiteral, 1));
        assert!(!a.same_shape(&c));
    }

    #[test]
    fn annotations_are_keyed_by_node() {
        let mut notes = Annotations::new();
        notes.set(NodeId(1), "left");
        notes.set(NodeId(1), "replaced");
        assert_eq!(notes.get(NodeId(1)), Some(&"replaced"));
        assert_eq!(notes.get(NodeId(0)), None);
        assert_eq!(notes.len(), 1);
    }
}

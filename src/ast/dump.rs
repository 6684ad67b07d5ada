//! Serializer for diagnostic tree dumps.
//!
//! A dump names each node by its op: `<Add state="3"><IntLiteral content="1"/>...</Add>`.
//! Null placeholders render as `<null />`. [`read_dump`] feeds a dump back
//! through the tag scanner and [`TreeBuilder`], so anything printed in a
//! failure report can be rebuilt for debugging.

use std::fmt;

use thiserror::Error;

use super::{Annotations, BuildError, Child, ContentError, Node, NodeId, NodeSpec, Tree, TreeBuilder};
use crate::registry::{LookupError, OpCode};
use crate::syntax::{get_attributes, tag_name, TagEvent};

/// Tag name of a null placeholder.
pub const NULL_TAG: &str = "null";

// ============================================================================
// WRITING
// ============================================================================

/// Renders a tree, or `<null />` for an absent one.
pub fn to_xml(tree: Option<&Tree>) -> String {
    render(tree, &|_| None)
}

/// Renders a tree with each node's annotation as a `state` attribute.
pub fn to_xml_annotated<A: fmt::Display>(tree: Option<&Tree>, annotations: &Annotations<A>) -> String {
    render(tree, &|id| annotations.get(id).map(ToString::to_string))
}

fn render(tree: Option<&Tree>, state: &dyn Fn(NodeId) -> Option<String>) -> String {
    let mut out = String::new();
    match tree {
        Some(tree) => write_tree(&mut out, tree, state),
        None => write_null(&mut out),
    }
    out
}

/// Pending output while walking a tree.
enum Step {
    Open(NodeId),
    Null,
    Close(&'static str),
}

fn write_tree(out: &mut String, tree: &Tree, state: &dyn Fn(NodeId) -> Option<String>) {
    let mut stack = vec![Step::Open(tree.root())];

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Open(id) => id,
            Step::Null => {
                write_null(out);
                continue;
            }
            Step::Close(name) => {
                out.push_str(&format!("</{}>", name));
                continue;
            }
        };

        let node = tree.node(id);
        let name = node.op().name();
        let mut attrs = String::new();

        if let Some(payload) = node.payload() {
            attrs.push_str(&format!(" content=\"{}\"", payload));
        }
        if let Some(state) = state(id) {
            attrs.push_str(&format!(" state=\"{}\"", state));
        }

        if node.children().is_empty() {
            // `<Name/>` would not scan as a start tag.
            let close = if attrs.is_empty() { " />" } else { "/>" };
            out.push_str(&format!("<{}{}{}", name, attrs, close));
            continue;
        }

        out.push_str(&format!("<{}{}>", name, attrs));
        stack.push(Step::Close(name));
        for child in node.children().iter().rev() {
            stack.push(match child {
                Child::Node(child) => Step::Open(*child),
                Child::Null => Step::Null,
            });
        }
    }
}

fn write_null(out: &mut String) {
    out.push('<');
    out.push_str(NULL_TAG);
    out.push_str(" />");
}

// ============================================================================
// READING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DumpError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("unexpected text in dump: {0}")]
    Stray(String),
    #[error("dump holds more than one tree")]
    ExtraTree,
}

/// Rebuilds the tree a dump was rendered from. `state` attributes are ignored.
///
/// ```rust
/// use treecheck::ast::dump::{read_dump, to_xml};
/// let tree = read_dump("<Negate><IntLiteral content=\"4\"/></Negate>").unwrap().unwrap();
/// assert_eq!(to_xml(Some(&tree)), "<Negate><IntLiteral content=\"4\"/></Negate>");
/// ```
pub fn read_dump(text: &str) -> Result<Option<Tree>, DumpError> {
    let mut builder = TreeBuilder::new();
    let mut result = None;

    for tag in split_tags(text)? {
        let stray = || DumpError::Stray(tag.to_string());
        let name = tag_name(tag).ok_or_else(stray)?;
        let event = TagEvent::classify(tag, name).ok_or_else(stray)?;

        let completed = match event {
            TagEvent::Close => builder.close()?,
            opening => {
                let spec = if name == NULL_TAG {
                    NodeSpec::Null
                } else {
                    let op = OpCode::resolve(name)?;
                    let attrs = get_attributes(tag);
                    NodeSpec::Node(Node::with_content(op, attrs.get("content"))?)
                };
                builder.open(spec, opening == TagEvent::SelfClosing)?
            }
        };

        if let Some(tree) = completed {
            if result.replace(tree).is_some() {
                return Err(DumpError::ExtraTree);
            }
        }
    }

    builder.finish()?;
    Ok(result)
}

/// Splits a dump into one tag per item. A `>` inside a quoted value does not
/// end its tag.
fn split_tags(text: &str) -> Result<Vec<&str>, DumpError> {
    let mut tags = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if !rest.starts_with('<') {
            let line = rest.lines().next().unwrap_or(rest);
            return Err(DumpError::Stray(line.to_string()));
        }

        let mut in_quote = false;
        let end = rest
            .char_indices()
            .find(|&(_, c)| {
                if c == '"' {
                    in_quote = !in_quote;
                }
                c == '>' && !in_quote
            })
            .map(|(i, _)| i)
            .ok_or_else(|| DumpError::Stray(rest.to_string()))?;

        tags.push(&rest[..=end]);
        rest = rest[end + 1..].trim_start();
    }

    Ok(tags)
}

//! Tag Scanner
//!
//! Classifies a single line as opening, closing, or self-closing a named tag.
//! Only the first tag on a line is ever considered.

/// What a line does to the tag it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEvent {
    /// `<Tag ...>`
    Open,
    /// `<Tag .../>`: an open and a close at once.
    SelfClosing,
    /// `</Tag>`
    Close,
}

impl TagEvent {
    /// Classifies `line` with respect to `tag`, or `None` if it is unrelated.
    pub fn classify(line: &str, tag: &str) -> Option<Self> {
        match (is_start_tag(line, tag), is_end_tag(line, tag)) {
            (true, true) => Some(TagEvent::SelfClosing),
            (true, false) => Some(TagEvent::Open),
            (false, true) => Some(TagEvent::Close),
            (false, false) => None,
        }
    }
}

fn after_indent(line: &str) -> &str {
    line.trim_start_matches([' ', '\t'])
}

/// True iff the line, after leading whitespace, begins with `<tag` followed
/// by a space or `>`.
///
/// ```rust
/// use treecheck::syntax::is_start_tag;
/// assert!(is_start_tag("  <Node op=\"Add\">", "Node"));
/// assert!(!is_start_tag("<Nodes>", "Node"));
/// ```
pub fn is_start_tag(line: &str, tag: &str) -> bool {
    let Some(rest) = after_indent(line).strip_prefix('<') else {
        return false;
    };
    let Some(after) = rest.strip_prefix(tag) else {
        return false;
    };
    matches!(after.as_bytes().first(), Some(b' ') | Some(b'>'))
}

/// True if the line self-closes `tag` or begins with `</tag`.
pub fn is_end_tag(line: &str, tag: &str) -> bool {
    if is_start_tag(line, tag) {
        return line.trim_end().ends_with("/>");
    }
    after_indent(line)
        .strip_prefix("</")
        .is_some_and(|rest| rest.starts_with(tag))
}

/// Name of the first tag on the line, open or close.
pub fn tag_name(line: &str) -> Option<&str> {
    let rest = after_indent(line).strip_prefix('<')?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let end = rest
        .find(|c: char| c == ' ' || c == '>' || c == '/')
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

//! Attribute Extractor
//!
//! Decodes `name="value"` pairs from the text of one tag. There is no escaping:
//! a value runs to the next `"`, and a name starts after the nearest space
//! before its `="`.

use std::collections::HashMap;

/// Values accepted as true for boolean attributes. Matching is exact.
pub const TRUTHY: [&str; 3] = ["yes", "true", "1"];

/// Decoded attributes of one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
    malformed: bool,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The value of `name`, treating an empty value as absent.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(is_truthy)
    }

    /// True if the scan stopped early on a broken `="` marker. Whatever was
    /// decoded before that point is still available.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn is_truthy(value: &str) -> bool {
    TRUTHY.contains(&value)
}

/// Decodes every attribute of `tag`; a repeated name keeps its last value.
///
/// ```rust
/// use treecheck::syntax::get_attributes;
/// let attrs = get_attributes("<Node op=\"x\"/>");
/// assert_eq!(attrs.get("op"), Some("x"));
/// assert_eq!(attrs.len(), 1);
/// ```
pub fn get_attributes(tag: &str) -> Attributes {
    let mut attrs = Attributes::default();
    let mut search_from = 0;

    while let Some(found) = tag[search_from..].find("=\"") {
        let marker = search_from + found;
        let value_start = marker + 2;
        let name_start = tag[..marker].rfind(' ');
        let value_end = tag[value_start..].find('"').map(|i| value_start + i);

        let (Some(name_start), Some(value_end)) = (name_start, value_end) else {
            attrs.malformed = true;
            break;
        };

        attrs.values.insert(
            tag[name_start + 1..marker].to_string(),
            tag[value_start..value_end].to_string(),
        );
        search_from = value_end + 1;
    }

    attrs
}

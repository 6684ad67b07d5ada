use std::fmt;
use std::path::Path;

use tracing::info;

use crate::ast::Tree;
use crate::registry::Nonterminal;
use crate::HarnessError;

pub mod discovery;

pub use loader::{load_file, load_testcases};
pub use runner::{RunSummary, TestOutcome, TestRunner};

/// What a testcase checks. The mode is fixed when the testcase is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Reduce to `kind` and compare against a literal.
    Value { kind: Nonterminal, expected: String },
    /// The tree must have a derivation to the kind.
    CanProduce(Nonterminal),
    /// The tree must have no derivation to the kind.
    CannotProduce(Nonterminal),
}

impl Expectation {
    /// The target kind, whatever the mode.
    pub fn kind(&self) -> Nonterminal {
        match self {
            Expectation::Value { kind, .. } => *kind,
            Expectation::CanProduce(kind) | Expectation::CannotProduce(kind) => *kind,
        }
    }

    pub fn expected_value(&self) -> Option<&str> {
        match self {
            Expectation::Value { expected, .. } => Some(expected),
            _ => None,
        }
    }

    /// The reachability query and the answer it wants, if this is one.
    pub fn query(&self) -> Option<(Nonterminal, bool)> {
        match self {
            Expectation::Value { .. } => None,
            Expectation::CanProduce(kind) => Some((*kind, true)),
            Expectation::CannotProduce(kind) => Some((*kind, false)),
        }
    }
}

/// Where a testcase was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub file: String,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A named tree and what it should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Testcase {
    pub name: String,
    pub expectation: Expectation,
    /// Absent when the testcase declares no tree, or only a null root.
    pub root: Option<Tree>,
    pub origin: Origin,
}

impl Testcase {
    pub fn kind(&self) -> Nonterminal {
        self.expectation.kind()
    }
}

/// Loads every testcase under `path`, a file or a directory, in file order.
/// Nothing is returned unless every file loads.
pub fn load_path(path: &Path) -> Result<Vec<Testcase>, HarnessError> {
    let files = discovery::discover_testcase_files(path)?;
    let mut testcases = Vec::new();
    for file in &files {
        testcases.extend(load_file(file)?);
    }
    info!(files = files.len(), testcases = testcases.len(), "loaded");
    Ok(testcases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_are_exclusive() {
        let value = Expectation::Value {
            kind: Nonterminal::Int,
            expected: "3".into(),
        };
        assert_eq!(value.expected_value(), Some("3"));
        assert_eq!(value.query(), None);

        let query = Expectation::CanProduce(Nonterminal::String);
        assert_eq!(query.expected_value(), None);
        assert_eq!(query.query(), Some((Nonterminal::String, true)));
        assert_eq!(Expectation::CannotProduce(Nonterminal::Short).query(), Some((Nonterminal::Short, false)));
    }

    #[test]
    fn origin_reads_like_a_location() {
        let origin = Origin {
            file: "cases.xml".into(),
            line: 12,
        };
        assert_eq!(origin.to_string(), "cases.xml:12");
    }
}

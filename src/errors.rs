//! treecheck Error Handling - Load-Phase Diagnostics
//!
//! Everything that can abort the load phase is a [`HarnessError`]. Errors raised
//! while *running* a testcase are not here: those belong to the reducer
//! ([`crate::reducer::ReductionError`]) and are recorded per testcase.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;

use crate::ast::builder::BuildError;
use crate::registry::LookupError;

// ============================================================================
// SOURCE TEXT
// ============================================================================

/// The text a diagnostic points into, usually a whole testcase file.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// A testcase file and its full text.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Stand-in for failures with no text to show, such as an unreadable path.
    pub fn fallback(subject: &str) -> Self {
        Self {
            name: subject.to_string(),
            content: format!("<!-- {} -->", subject),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(&self.name, self.content.clone()))
    }
}

/// A load-phase failure with the file and line it came from.
#[derive(Debug)]
pub struct HarnessError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// Every fatal load-phase failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Io { path: String, message: String },
    UnrecognizedOperation { name: String },
    UnresolvedNonterminal { name: String },
    MalformedNode { reason: String },
    InvalidContent { op: String, content: String },
    UnbalancedTree { reason: String },
    MisplacedNode { reason: String },
}

/// Where in the input a load error was found.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Code and help text shown with the diagnostic.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// Context-aware error creation
pub trait ErrorReporting {
    /// Wraps `kind` with this context's source, code and help text.
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> HarnessError;

    fn unbalanced(&self, reason: &str, span: SourceSpan) -> HarnessError {
        self.report(
            ErrorKind::UnbalancedTree {
                reason: reason.into(),
            },
            span,
        )
    }

    fn malformed_node(&self, reason: &str, span: SourceSpan) -> HarnessError {
        self.report(
            ErrorKind::MalformedNode {
                reason: reason.into(),
            },
            span,
        )
    }

    fn lookup_failure(&self, error: LookupError, span: SourceSpan) -> HarnessError {
        self.report(error.into(), span)
    }

    fn build_failure(&self, error: BuildError, span: SourceSpan) -> HarnessError {
        self.report(error.into(), span)
    }
}

impl ErrorKind {
    /// Last segment of the diagnostic code.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::UnrecognizedOperation { .. } => "unrecognized_operation",
            Self::UnresolvedNonterminal { .. } => "unresolved_nonterminal",
            Self::MalformedNode { .. } => "malformed_node",
            Self::InvalidContent { .. } => "invalid_content",
            Self::UnbalancedTree { .. } => "unbalanced_tree",
            Self::MisplacedNode { .. } => "misplaced_node",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::MalformedNode { .. } => {
                Some("every <Node> needs either op=\"...\" or null=\"true\", not both".into())
            }
            Self::UnbalancedTree { .. } => {
                Some("each <Node> must be closed before its <Testcase> ends".into())
            }
            Self::UnresolvedNonterminal { .. } => Some(format!(
                "known kinds: {}",
                crate::registry::Nonterminal::ALL
                    .iter()
                    .map(|nt| nt.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            _ => None,
        }
    }
}

impl From<LookupError> for ErrorKind {
    fn from(error: LookupError) -> Self {
        match error {
            LookupError::UnrecognizedOperation(name) => Self::UnrecognizedOperation { name },
            LookupError::UnresolvedNonterminal(name) => Self::UnresolvedNonterminal { name },
        }
    }
}

impl From<BuildError> for ErrorKind {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::Unbalanced(reason) => Self::UnbalancedTree {
                reason: reason.to_string(),
            },
            BuildError::NullWithChildren => Self::MalformedNode {
                reason: error.to_string(),
            },
        }
    }
}

impl std::error::Error for HarnessError {}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io { path, message } => {
                write!(f, "Load error: cannot read '{}': {}", path, message)
            }
            ErrorKind::UnrecognizedOperation { name } => {
                write!(f, "Load error: unrecognized operation '{}'", name)
            }
            ErrorKind::UnresolvedNonterminal { name } => {
                write!(f, "Load error: unknown target kind '{}'", name)
            }
            ErrorKind::MalformedNode { reason } => {
                write!(f, "Load error: malformed node: {}", reason)
            }
            ErrorKind::InvalidContent { op, content } => {
                write!(
                    f,
                    "Load error: content '{}' of {} is not an integer",
                    content, op
                )
            }
            ErrorKind::UnbalancedTree { reason } => {
                write!(f, "Load error: unbalanced tree: {}", reason)
            }
            ErrorKind::MisplacedNode { reason } => {
                write!(f, "Load error: misplaced node: {}", reason)
            }
        }
    }
}

impl Diagnostic for HarnessError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl HarnessError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::Io { .. } => "unreadable input".into(),
            ErrorKind::UnrecognizedOperation { .. } => "unknown op".into(),
            ErrorKind::UnresolvedNonterminal { .. } => "unknown kind".into(),
            ErrorKind::MalformedNode { .. } => "malformed node".into(),
            ErrorKind::InvalidContent { .. } => "invalid content".into(),
            ErrorKind::UnbalancedTree { .. } => "unbalanced here".into(),
            ErrorKind::MisplacedNode { .. } => "misplaced node".into(),
        }
    }
}

/// Creates a placeholder span for errors not tied to a specific source
/// location, such as I/O errors.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// An unreadable input path. There is no source text to point into.
pub fn io_failure(path: impl Into<String>, message: impl ToString) -> HarnessError {
    let path = path.into();
    LoadContext::new(SourceContext::fallback(&path)).report(
        ErrorKind::Io {
            path,
            message: message.to_string(),
        },
        unspanned(),
    )
}

/// Reports errors while loading one testcase file.
pub struct LoadContext {
    pub source: SourceContext,
    pub phase: String,
}

impl LoadContext {
    pub fn new(source: SourceContext) -> Self {
        Self {
            source,
            phase: "load".to_string(),
        }
    }
}

impl ErrorReporting for LoadContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> HarnessError {
        let error_code = format!("treecheck::{}::{}", self.phase, kind.code_suffix());
        let help = kind.default_help();

        HarnessError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

// ============================================================================
// PRINTING
// ============================================================================

/// Prints a HarnessError with full miette diagnostics to stderr.
pub fn print_error(error: HarnessError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    fn context() -> LoadContext {
        LoadContext::new(SourceContext::from_file(
            "cases.xml",
            "<Test>\n  <Node op=\"Bogus\"/>\n</Test>\n",
        ))
    }

    #[test]
    fn error_code_names_phase_and_kind() {
        let err = context().unbalanced("end tag without open node", (7..26).into());
        assert_eq!(err.diagnostic_info.error_code, "treecheck::load::unbalanced_tree");
        assert!(err.to_string().contains("end tag without open node"));
    }

    #[test]
    fn lookup_failures_keep_the_offending_name() {
        let err = context().lookup_failure(
            LookupError::UnrecognizedOperation("Bogus".into()),
            (7..26).into(),
        );
        assert_eq!(
            err.kind,
            ErrorKind::UnrecognizedOperation {
                name: "Bogus".into()
            }
        );
    }

    #[test]
    fn report_renders_label_and_help() {
        let err = context().malformed_node("missing op", (7..26).into());
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("malformed node"));
        assert!(output.contains("null=\"true\""));
    }
}

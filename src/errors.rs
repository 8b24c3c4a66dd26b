//! Trellis error handling
//!
//! A single error type covers every *fatal* defect: grammar construction
//! problems (duplicate or unresolved rules), matching defects that indicate
//! an authoring bug (left recursion, the recursion fuse), and input decoding
//! failures. Ordinary match failures are NOT errors — they are values
//! ([`crate::matcher::MatchOutcome`]) returned to the caller, never escalated.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// A fatal engine defect, with optional source attachment for rich reporting.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct EngineError {
    pub kind: ErrorKind,
    source_info: Option<Arc<NamedSource<String>>>,
    span: Option<SourceSpan>,
    help: Option<String>,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Construction defects - grammar wiring bugs, caught before any input
    #[error("duplicate rule '{name}'")]
    DuplicateRule { name: String },
    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },
    #[error("rule '{rule}' references undefined rule '{target}'")]
    UnresolvedReference { rule: String, target: String },
    #[error("rule '{name}' was declared but never given an expression")]
    UndefinedExpression { name: String },

    // Matching defects - authoring bugs detected mid-parse
    #[error("left recursion: rule '{rule}' re-entered at offset {at} without consuming input")]
    LeftRecursion { rule: String, at: usize },
    #[error("recursion depth limit of {limit} exceeded")]
    RecursionLimit { limit: usize },

    // Input defects
    #[error("input is not valid {encoding}")]
    Decode { encoding: String, at: usize },
}

/// Error category for test assertions and diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Construction,
    Matching,
    Input,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Construction => "construction",
            Self::Matching => "matching",
            Self::Input => "input",
        }
    }
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateRule { .. }
            | Self::UnknownRule { .. }
            | Self::UnresolvedReference { .. }
            | Self::UndefinedExpression { .. } => ErrorCategory::Construction,

            Self::LeftRecursion { .. } | Self::RecursionLimit { .. } => ErrorCategory::Matching,

            Self::Decode { .. } => ErrorCategory::Input,
        }
    }

    /// Error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::DuplicateRule { .. } => "duplicate_rule",
            Self::UnknownRule { .. } => "unknown_rule",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::UndefinedExpression { .. } => "undefined_expression",
            Self::LeftRecursion { .. } => "left_recursion",
            Self::RecursionLimit { .. } => "recursion_limit",
            Self::Decode { .. } => "decode",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::DuplicateRule { .. } => "already defined",
            Self::UnknownRule { .. } => "no such rule",
            Self::UnresolvedReference { .. } => "undefined reference",
            Self::UndefinedExpression { .. } => "expression never set",
            Self::LeftRecursion { .. } => "re-entered here",
            Self::RecursionLimit { .. } => "depth limit hit here",
            Self::Decode { .. } => "first invalid byte",
        }
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl EngineError {
    /// A defect with no input attached (grammar construction, decoding).
    pub(crate) fn bare(kind: ErrorKind) -> Self {
        Self {
            kind,
            source_info: None,
            span: None,
            help: None,
        }
    }

    /// A defect at a position in the input being matched.
    pub(crate) fn in_input(kind: ErrorKind, input: &str, at: usize) -> Self {
        Self {
            kind,
            source_info: Some(Arc::new(NamedSource::new("input", input.to_string()))),
            span: Some(SourceSpan::from(at..at)),
            help: None,
        }
    }

    pub(crate) fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl Diagnostic for EngineError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "trellis::{}::{}",
            self.kind.category().as_str(),
            self.kind.code_suffix()
        )))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = LabeledSpan::new_with_span(Some(self.kind.primary_label().to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_info
            .as_ref()
            .map(|s| &**s as &dyn miette::SourceCode)
    }
}

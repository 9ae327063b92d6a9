//! Frame Validation
//!
//! Structural checks over generated frame markup plus the advisory density
//! heuristic. Validators never fail: every finding is reported as a
//! [`ValidationIssue`], either blocking (an error) or advisory (a warning).

pub mod density;
pub mod structural;
pub mod tokenizer;

pub use density::{DensityReport, DensityValidator};
pub use structural::StructuralValidator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a validation finding. The kind alone decides whether it blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    InvalidTag,
    /// Reserved; no check currently emits it.
    UnclosedTag,
    InvalidNesting,
    MissingDataScript,
    ParseError,
    MissingAlt,
    EmptyContent,
    LargeOutput,
    /// Reserved; no check currently emits it.
    UnknownAttribute,
}

impl IssueKind {
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            IssueKind::InvalidTag
                | IssueKind::UnclosedTag
                | IssueKind::InvalidNesting
                | IssueKind::MissingDataScript
                | IssueKind::ParseError
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::InvalidTag => "invalid_tag",
            IssueKind::UnclosedTag => "unclosed_tag",
            IssueKind::InvalidNesting => "invalid_nesting",
            IssueKind::MissingDataScript => "missing_data_script",
            IssueKind::ParseError => "parse_error",
            IssueKind::MissingAlt => "missing_alt",
            IssueKind::EmptyContent => "empty_content",
            IssueKind::LargeOutput => "large_output",
            IssueKind::UnknownAttribute => "unknown_attribute",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn prefixed(mut self, prefix: &str) -> Self {
        self.message = format!("{}{}", prefix, self.message);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {}: {}", self.kind, line, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Outcome of validating one frame, or several frames merged.
///
/// `valid` always equals `errors.is_empty()`; mutate through [`ValidationResult::push`]
/// to keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue as an error or a warning according to its kind.
    pub fn push(&mut self, issue: ValidationIssue) {
        if issue.kind.is_blocking() {
            self.errors.push(issue);
            self.valid = false;
        } else {
            self.warnings.push(issue);
        }
    }

    /// Merge per-frame results. Messages gain a `Frame N: ` prefix (1-based) and the
    /// merged result is valid only if every frame was.
    pub fn merge_frames(results: impl IntoIterator<Item = ValidationResult>) -> Self {
        let mut merged = Self::new();
        for (index, result) in results.into_iter().enumerate() {
            let prefix = format!("Frame {}: ", index + 1);
            for issue in result.errors.into_iter().chain(result.warnings) {
                merged.push(issue.prefixed(&prefix));
            }
        }
        merged
    }

    /// Error messages only, in report order; warnings never feed a retry.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|issue| issue.message.clone()).collect()
    }

    pub fn has_kind(&self, kind: IssueKind) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.kind == kind)
    }
}

//! Validation report model.
//!
//! # Invariants
//! - `is_valid` is true iff `errors` is empty.
//! - Entries follow template order, then discovery order of unknown sections.
//! - A report is immutable once built.

use serde::Serialize;

/// Category of one validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required section has no matching heading.
    MissingRequiredSection,
    /// Heading does not match any template section.
    UnknownSection,
    /// Several headings resolve to the same template section.
    DuplicateSection,
    /// Matching heading exists but its body is blank.
    EmptySection,
    /// Section content was inferred from unstructured text.
    InferredSection,
}

impl IssueKind {
    /// Stable string id used by boundary layers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequiredSection => "missing_required_section",
            Self::UnknownSection => "unknown_section",
            Self::DuplicateSection => "duplicate_section",
            Self::EmptySection => "empty_section",
            Self::InferredSection => "inferred_section",
        }
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub section: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, section: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            section: Some(section.into()),
            message: message.into(),
        }
    }
}

/// Result of one validate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Resolved template id.
    pub template: String,
    pub strict: bool,
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// Informational entries; never escalated by strict mode.
    pub info: Vec<Issue>,
}

impl ValidationReport {
    pub(crate) fn build(
        template: &str,
        strict: bool,
        errors: Vec<Issue>,
        warnings: Vec<Issue>,
        info: Vec<Issue>,
    ) -> Self {
        Self {
            template: template.to_string(),
            strict,
            is_valid: errors.is_empty(),
            errors,
            warnings,
            info,
        }
    }

    pub fn errors_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.errors.iter().filter(move |issue| issue.kind == kind)
    }

    pub fn warnings_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.warnings.iter().filter(move |issue| issue.kind == kind)
    }
}

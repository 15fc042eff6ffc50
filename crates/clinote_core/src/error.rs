//! Engine-level error taxonomy.
//!
//! # Responsibility
//! - Describe every failure an engine operation can surface to callers.
//! - Provide stable string codes for boundary layers (FFI/CLI).
//!
//! # Invariants
//! - `ValidationFailed` always carries the complete report.
//! - Parsing never produces an error; malformed input degrades instead.

use crate::model::report::ValidationReport;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for engine operations.
pub type NoteResult<T> = Result<T, NoteError>;

/// Failure of one engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// Template is neither a registered name nor a valid inline definition.
    UnknownTemplate {
        template: String,
        detail: Option<String>,
    },
    /// Requested output format is not supported by the converter.
    UnsupportedFormat(String),
    /// Strict conversion aborted because validation produced errors.
    ValidationFailed(Box<ValidationReport>),
    /// Engine was used before `init_engine`.
    NotInitialized,
    /// Configuration could not be loaded or conflicts with active state.
    Config(String),
    /// Output could not be produced (serializer failure).
    Internal(String),
}

impl NoteError {
    /// Stable machine-readable code for boundary envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownTemplate { .. } => "unknown_template",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::ValidationFailed(_) => "validation_failed",
            Self::NotInitialized => "not_initialized",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns the attached report for `ValidationFailed`.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::ValidationFailed(report) => Some(report),
            _ => None,
        }
    }

    pub(crate) fn unknown_template(template: &str, detail: Option<String>) -> Self {
        Self::UnknownTemplate {
            template: display_template(template),
            detail,
        }
    }
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTemplate { template, detail } => {
                write!(
                    f,
                    "unsupported template `{template}`; use one of: soap, hp, discharge, or an inline definition"
                )?;
                if let Some(detail) = detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            Self::UnsupportedFormat(value) => write!(
                f,
                "unsupported output format `{value}`; use one of: plain, markdown, json, csv"
            ),
            Self::ValidationFailed(report) => {
                write!(f, "strict validation failed:")?;
                for issue in &report.errors {
                    write!(f, "\n- {}", issue.message)?;
                }
                Ok(())
            }
            Self::NotInitialized => write!(f, "engine is not initialized; call init_engine first"),
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for NoteError {}

const MAX_TEMPLATE_DISPLAY_CHARS: usize = 48;

// Inline definitions can be long; keep messages single-line and bounded.
fn display_template(template: &str) -> String {
    let flattened = template.trim().replace(['\n', '\r'], " ");
    let mut out = flattened
        .chars()
        .take(MAX_TEMPLATE_DISPLAY_CHARS)
        .collect::<String>();
    if flattened.chars().count() > MAX_TEMPLATE_DISPLAY_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::NoteError;

    #[test]
    fn codes_are_stable() {
        assert_eq!(NoteError::NotInitialized.code(), "not_initialized");
        assert_eq!(
            NoteError::UnsupportedFormat("pdf".to_string()).code(),
            "unsupported_format"
        );
        assert_eq!(
            NoteError::unknown_template("x", None).code(),
            "unknown_template"
        );
    }

    #[test]
    fn unknown_template_message_is_bounded_and_single_line() {
        let long = format!("line one\n{}", "x".repeat(200));
        let err = NoteError::unknown_template(&long, Some("bad inline".to_string()));
        let message = err.to_string();
        assert!(!message.contains('\n'));
        assert!(message.contains("..."));
        assert!(message.contains("bad inline"));
    }
}

//! Multi-note bundles.
//!
//! # Responsibility
//! - Split text holding several notes separated by `---` lines.
//! - Carry per-note results with 1-based note indices.
//!
//! # Invariants
//! - A delimiter is a line whose trimmed content is exactly `---`.
//! - Blank chunks are skipped; text without any non-blank chunk is one note.
//! - Normalized bundles never contain a delimiter line inside a note, so
//!   normalizing a normalized bundle is a no-op.

use crate::model::report::ValidationReport;
use crate::preview::SectionPreview;
use serde::Serialize;

/// Line separating notes in a bundle.
pub const NOTE_DELIMITER: &str = "---";

/// Validation result of one note in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteReport {
    pub note_index: usize,
    pub report: ValidationReport,
}

/// Validation result of a whole bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub template: String,
    pub strict: bool,
    /// True iff every note is valid.
    pub is_valid: bool,
    pub notes: Vec<NoteReport>,
}

impl BundleReport {
    pub(crate) fn build(template: &str, strict: bool, reports: Vec<ValidationReport>) -> Self {
        let notes = reports
            .into_iter()
            .enumerate()
            .map(|(idx, report)| NoteReport {
                note_index: idx + 1,
                report,
            })
            .collect::<Vec<_>>();
        Self {
            template: template.to_string(),
            strict,
            is_valid: notes.iter().all(|note| note.report.is_valid),
            notes,
        }
    }
}

/// Section previews of one note in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePreview {
    pub note_index: usize,
    pub sections: Vec<SectionPreview>,
}

/// Splits a bundle into note texts.
pub fn split_bundle(text: &str) -> Vec<&str> {
    let mut notes = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if is_delimiter(line) {
            notes.push(&text[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    notes.push(&text[start..]);

    let notes = notes
        .into_iter()
        .filter(|note| !note.trim().is_empty())
        .collect::<Vec<_>>();
    if notes.is_empty() {
        return vec![text];
    }
    notes
}

/// Joins normalized notes, dropping empty ones and escaping delimiter lines.
pub fn join_notes(notes: impl IntoIterator<Item = String>) -> String {
    notes
        .into_iter()
        .filter(|note| !note.is_empty())
        .map(|note| escape_delimiters(&note))
        .collect::<Vec<_>>()
        .join(&format!("\n\n{NOTE_DELIMITER}\n\n"))
}

fn is_delimiter(line: &str) -> bool {
    line.trim() == NOTE_DELIMITER
}

fn escape_delimiters(note: &str) -> String {
    note.lines()
        .map(|line| {
            if is_delimiter(line) {
                let rest = line.trim_start();
                let indent = &line[..line.len() - rest.len()];
                format!("{indent}\\{rest}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

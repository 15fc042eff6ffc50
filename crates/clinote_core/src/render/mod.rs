//! Output renderers for normalized notes.
//!
//! # Responsibility
//! - Map output format names to renderers.
//! - Render normalized notes so the parser can re-ingest the result.
//!
//! # Invariants
//! - Every renderer is deterministic.
//! - Rendering never reorders or rewrites normalized content.

pub mod document;

use crate::error::{NoteError, NoteResult};
use crate::normalize::NormalizedNote;
use document::{RenderedDocument, RenderedSection, CSV_HEADER, DOCUMENT_FORMAT_VERSION};

/// Supported converter output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Markdown,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parses a format name (case-insensitive, with aliases).
    ///
    /// # Errors
    /// - `UnsupportedFormat` for any other name.
    pub fn parse(value: &str) -> NoteResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "txt" => Ok(Self::Plain),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(NoteError::UnsupportedFormat(value.trim().to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Every supported format, in documentation order.
    pub fn all() -> [Self; 4] {
        [Self::Plain, Self::Markdown, Self::Json, Self::Csv]
    }
}

/// Renders a normalized note in the requested format.
///
/// # Errors
/// - `Internal` when JSON serialization fails.
pub fn render(note: &NormalizedNote, format: OutputFormat) -> NoteResult<String> {
    match format {
        OutputFormat::Plain => Ok(note.to_text()),
        OutputFormat::Markdown => Ok(render_markdown(note)),
        OutputFormat::Json => render_json(note),
        OutputFormat::Csv => Ok(render_csv(note)),
    }
}

fn render_markdown(note: &NormalizedNote) -> String {
    let mut parts = Vec::with_capacity(note.sections.len() + 1);
    if let Some(preamble) = &note.preamble {
        parts.push(preamble.clone());
    }
    for section in &note.sections {
        parts.push(format!("## {}\n\n{}", section.name, section.body));
    }
    note.guard_structured(parts.join("\n\n"))
}

fn render_json(note: &NormalizedNote) -> NoteResult<String> {
    serde_json::to_string_pretty(&to_document(note))
        .map_err(|err| NoteError::Internal(format!("failed to serialize document: {err}")))
}

/// Structured view of a normalized note.
pub fn to_document(note: &NormalizedNote) -> RenderedDocument {
    RenderedDocument {
        format_version: DOCUMENT_FORMAT_VERSION,
        template: note.template.clone(),
        preamble: note.preamble.clone(),
        sections: note
            .sections
            .iter()
            .map(|section| RenderedSection {
                name: section.name.clone(),
                content: section.body.clone(),
            })
            .collect(),
    }
}

fn render_csv(note: &NormalizedNote) -> String {
    let mut rows = vec![CSV_HEADER.to_string()];
    if let Some(preamble) = &note.preamble {
        rows.push(format!(",{}", csv_field(preamble)));
    }
    for section in &note.sections {
        rows.push(format!(
            "{},{}",
            csv_field(&section.name),
            csv_field(&section.body)
        ));
    }
    rows.join("\n")
}

fn csv_field(value: &str) -> String {
    let needs_quotes = value.contains([',', '"', '\n', '\r'])
        || value.starts_with(' ')
        || value.ends_with(' ');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

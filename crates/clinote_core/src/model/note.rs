//! Parsed note model.
//!
//! # Invariants
//! - Sections appear in source order.
//! - At most one preamble section exists, and only as the first section.
//! - Section bodies never carry leading blank lines or trailing whitespace.

use serde::Serialize;

/// Source location of one section (heading line through last body line).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    /// 1-based first line.
    pub start_line: usize,
    /// 1-based last line, inclusive.
    pub end_line: usize,
    pub start_byte: usize,
    /// Exclusive byte offset.
    pub end_byte: usize,
}

/// One heading-delimited span of note text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading text as found (whitespace-collapsed), or `Preamble`.
    pub name: String,
    pub body: String,
    pub span: SourceSpan,
    /// Text before the first heading.
    pub is_preamble: bool,
}

impl Section {
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Display name of the implicit leading section.
pub const PREAMBLE_NAME: &str = "Preamble";

/// Parser output, owned per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedNote {
    pub sections: Vec<Section>,
}

impl ParsedNote {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn preamble(&self) -> Option<&Section> {
        self.sections.first().filter(|section| section.is_preamble)
    }

    /// Sections introduced by a heading.
    pub fn headed_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|section| !section.is_preamble)
    }
}

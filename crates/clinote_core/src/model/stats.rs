//! Normalization statistics.

use serde::Serialize;

/// Per-section counters over normalized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub name: String,
    pub word_count: usize,
    pub line_count: usize,
}

/// Read-only statistics derived from a normalized note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Headed sections in the normalized result (preamble excluded).
    pub section_count: usize,
    /// Words across all sections, preamble included.
    pub word_count: usize,
    pub sections: Vec<SectionStats>,
    /// Required sections still absent after normalization, in template order.
    pub missing_required: Vec<String>,
    pub has_preamble: bool,
    pub removed_empty_sections: usize,
    pub merged_duplicates: usize,
    /// Preamble lines moved into sections by heuristic inference.
    pub inferred_lines: usize,
}

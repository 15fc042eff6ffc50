//! Canonical rewriting of parsed notes.
//!
//! # Responsibility
//! - Order sections by template, merge duplicates and drop empty sections.
//! - Apply per-section format rules to headings and bodies.
//!
//! # Invariants
//! - Output order: preamble, known sections by `order_index`, then unknown
//!   sections in discovery order.
//! - Rendering the result and parsing it again with the same template yields
//!   the same normalized note (idempotence).
//! - No body line re-parses as a heading: such lines are escaped with a `\`
//!   after their indentation.

use crate::model::note::ParsedNote;
use crate::model::stats::{SectionStats, Stats};
use crate::model::template::{FormatRule, Template};
use crate::parser::grammar::{canonical_heading, fits_label};
use crate::parser::structured::looks_structured;
use crate::parser::Parser;
use crate::text::{heading_key, trim_block, word_count};

/// One section of a normalized note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSection {
    pub name: String,
    pub body: String,
    /// Whether the section matched a template spec.
    pub known: bool,
}

/// Normalizer output, independent of any rendering format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedNote {
    pub template: String,
    pub preamble: Option<String>,
    pub sections: Vec<NormalizedSection>,
    /// Required sections absent from `sections`, in template order.
    pub missing_required: Vec<String>,
    pub removed_empty_sections: usize,
    pub merged_duplicates: usize,
}

struct Group<'a> {
    name: String,
    bodies: Vec<&'a str>,
}

impl<'a> Group<'a> {
    fn new(name: String) -> Self {
        Self {
            name,
            bodies: Vec::new(),
        }
    }
}

/// Normalizes one parsed note against a template.
pub fn normalize_note(note: &ParsedNote, template: &Template) -> NormalizedNote {
    let specs = template.sections();
    let parser = Parser::for_template(template);
    let mut known: Vec<Option<Group<'_>>> = specs.iter().map(|_| None).collect();
    let mut unknown: Vec<(String, Group<'_>)> = Vec::new();
    let mut preamble = None;

    for section in &note.sections {
        if section.is_preamble {
            preamble = Some(canonical_body(&section.body, FormatRule::default(), &parser))
                .filter(|body| !body.is_empty());
            continue;
        }
        let key = heading_key(&section.name);
        let group = match template.position_of_key(&key) {
            Some(idx) => known[idx].get_or_insert_with(|| Group::new(specs[idx].display_name())),
            None => match unknown.iter().position(|(existing, _)| *existing == key) {
                Some(pos) => &mut unknown[pos].1,
                None => {
                    unknown.push((key, Group::new(canonical_heading(&section.name))));
                    let last = unknown.len() - 1;
                    &mut unknown[last].1
                }
            },
        };
        group.bodies.push(section.body.as_str());
    }

    let mut normalized = NormalizedNote {
        template: template.id().to_string(),
        preamble,
        sections: Vec::new(),
        missing_required: Vec::new(),
        removed_empty_sections: 0,
        merged_duplicates: 0,
    };

    let known_groups = known
        .into_iter()
        .enumerate()
        .filter_map(|(idx, group)| group.map(|group| (group, specs[idx].format_rule, true)));
    let unknown_groups = unknown
        .into_iter()
        .map(|(_, group)| (group, FormatRule::default(), false));

    for (group, rule, is_known) in known_groups.chain(unknown_groups) {
        normalized.merged_duplicates += group.bodies.len() - 1;
        let body = canonical_body(&group.bodies.join("\n\n"), rule, &parser);
        if body.is_empty() {
            normalized.removed_empty_sections += 1;
            continue;
        }
        normalized.sections.push(NormalizedSection {
            name: group.name,
            body,
            known: is_known,
        });
    }

    normalized.missing_required = template
        .required_sections()
        .filter(|spec| {
            !normalized
                .sections
                .iter()
                .any(|section| section.known && spec.matches_key(&heading_key(&section.name)))
        })
        .map(|spec| spec.name.clone())
        .collect();
    normalized
}

impl NormalizedNote {
    /// Canonical plain-text form; re-parses to the same note.
    pub fn to_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 1);
        if let Some(preamble) = &self.preamble {
            parts.push(preamble.clone());
        }
        for section in &self.sections {
            parts.push(format!("{}\n{}", heading_line(&section.name), section.body));
        }
        self.guard_structured(parts.join("\n\n"))
    }

    /// Escapes text that starts with the preamble and would otherwise be
    /// re-ingested as a JSON or CSV document.
    pub(crate) fn guard_structured(&self, text: String) -> String {
        if self.preamble.is_some() && looks_structured(&text) {
            format!("\\{text}")
        } else {
            text
        }
    }

    /// Statistics over the normalized result.
    pub fn stats(&self, inferred_lines: usize) -> Stats {
        let sections = self
            .sections
            .iter()
            .map(|section| SectionStats {
                name: section.name.clone(),
                word_count: word_count(&section.body),
                line_count: section.body.lines().count(),
            })
            .collect::<Vec<_>>();
        let preamble_words = self.preamble.as_deref().map_or(0, word_count);

        Stats {
            section_count: sections.len(),
            word_count: preamble_words + sections.iter().map(|s| s.word_count).sum::<usize>(),
            sections,
            missing_required: self.missing_required.clone(),
            has_preamble: self.preamble.is_some(),
            removed_empty_sections: self.removed_empty_sections,
            merged_duplicates: self.merged_duplicates,
            inferred_lines,
        }
    }

}

/// Heading line used by the plain-text form.
pub fn heading_line(name: &str) -> String {
    if fits_label(name) {
        format!("{name}:")
    } else {
        format!("## {name}")
    }
}

fn canonical_body(body: &str, rule: FormatRule, parser: &Parser) -> String {
    let mut lines = Vec::new();
    let mut previous_blank = false;
    for line in body.lines() {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank && rule.collapse_blank_lines {
            continue;
        }
        previous_blank = blank;
        let line = if rule.normalize_bullets {
            normalize_bullet(line)
        } else {
            line.to_string()
        };
        if parser.is_heading(&line) {
            lines.push(escape_heading(&line));
        } else {
            lines.push(line);
        }
    }
    trim_block(&lines.join("\n")).to_string()
}

fn normalize_bullet(line: &str) -> String {
    let rest = line.trim_start();
    let indent = &line[..line.len() - rest.len()];
    for marker in ["* ", "+ ", "• "] {
        if let Some(item) = rest.strip_prefix(marker) {
            return format!("{indent}- {item}");
        }
    }
    line.to_string()
}

fn escape_heading(line: &str) -> String {
    let rest = line.trim_start();
    let indent = &line[..line.len() - rest.len()];
    format!("{indent}\\{rest}")
}

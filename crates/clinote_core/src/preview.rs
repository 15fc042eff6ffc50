//! Per-section previews for UI display.

use crate::model::note::{ParsedNote, Section};
use crate::model::template::Template;
use crate::text::{collapse_whitespace, heading_key, truncate_chars};
use serde::Serialize;

/// Preview of one template section (or of an extra section found in the note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPreview {
    pub name: String,
    /// Whether at least one heading matched this section.
    pub present: bool,
    pub snippet: String,
    pub line_count: usize,
    pub char_count: usize,
}

/// Builds previews: preamble first, then template sections in order, then
/// unknown sections in discovery order.
pub fn preview_sections(
    note: &ParsedNote,
    template: &Template,
    max_chars: usize,
) -> Vec<SectionPreview> {
    let mut previews = Vec::new();
    if let Some(preamble) = note.preamble() {
        previews.push(preview_of(&preamble.name, &[preamble], max_chars));
    }

    let keyed = note
        .headed_sections()
        .map(|section| (heading_key(&section.name), section))
        .collect::<Vec<_>>();
    for spec in template.sections() {
        let matches = keyed
            .iter()
            .filter(|(key, _)| spec.matches_key(key))
            .map(|(_, section)| *section)
            .collect::<Vec<_>>();
        previews.push(preview_of(&spec.name, &matches, max_chars));
    }
    for (key, section) in &keyed {
        if template.position_of_key(key).is_none() {
            previews.push(preview_of(&section.name, &[*section], max_chars));
        }
    }
    previews
}

fn preview_of(name: &str, sections: &[&Section], max_chars: usize) -> SectionPreview {
    let body = sections
        .iter()
        .map(|section| section.body.as_str())
        .filter(|body| !body.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    SectionPreview {
        name: name.to_string(),
        present: !sections.is_empty(),
        snippet: truncate_chars(&collapse_whitespace(&body), max_chars),
        line_count: body.lines().filter(|line| !line.trim().is_empty()).count(),
        char_count: body.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::preview_sections;
    use crate::parser::Parser;
    use crate::template::builtin::soap;

    #[test]
    fn lists_preamble_template_sections_and_extras() {
        let template = soap().expect("soap should build");
        let note = Parser::for_template(&template)
            .parse("triage note\nA: viral   syndrome\nmild\nSocial:\nsmoker");
        let previews = preview_sections(&note, &template, 80);
        let shape = previews
            .iter()
            .map(|preview| (preview.name.as_str(), preview.present, preview.snippet.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            shape,
            vec![
                ("Preamble", true, "triage note"),
                ("Subjective", false, ""),
                ("Objective", false, ""),
                ("Assessment", true, "viral syndrome mild"),
                ("Plan", false, ""),
                ("Narrative", false, ""),
                ("Social", true, "smoker"),
            ]
        );
        assert_eq!(previews[3].line_count, 2);
    }

    #[test]
    fn snippets_are_truncated() {
        let template = soap().expect("soap should build");
        let note = Parser::for_template(&template).parse(&format!("Plan:\n{}", "x".repeat(30)));
        let previews = preview_sections(&note, &template, 10);
        assert_eq!(previews[3].snippet, format!("{}...", "x".repeat(10)));
    }

    #[test]
    fn malformed_input_degrades_to_absent_sections() {
        let template = soap().expect("soap should build");
        let previews = preview_sections(&Parser::structural().parse("{not json"), &template, 20);
        assert_eq!(previews.len(), 6);
        assert_eq!(previews[0].snippet, "{not json");
    }
}

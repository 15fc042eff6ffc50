//! Heuristic section inference for loosely structured notes.
//!
//! # Responsibility
//! - Move preamble lines that look like content of a missing section into
//!   that section, using the template's inference keywords.
//!
//! # Invariants
//! - Only preamble lines move; headed sections are never rewritten except to
//!   fill a blank section that matches the target.
//! - A section counts as missing when no matching section has a non-blank body.
//! - Running inference on its own output is a no-op.

use crate::model::note::{ParsedNote, Section};
use crate::model::template::Template;
use crate::text::{heading_key, trim_block};
use serde::Serialize;

/// One inferred section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    pub section: String,
    pub lines: usize,
}

/// Applies keyword inference in place and reports what moved.
pub fn infer_sections(note: &mut ParsedNote, template: &Template) -> Vec<Inference> {
    if !template.has_inference() {
        return Vec::new();
    }
    let Some(preamble) = note.sections.first().filter(|section| section.is_preamble) else {
        return Vec::new();
    };

    let missing = template
        .sections()
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.has_keywords())
        .filter(|(_, spec)| {
            !note.headed_sections().any(|section| {
                !section.is_blank() && spec.matches_key(&heading_key(&section.name))
            })
        })
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    if missing.is_empty() {
        return Vec::new();
    }

    let (span, remaining, filled) = {
        let mut buckets: Vec<Vec<&str>> = vec![Vec::new(); template.sections().len()];
        let mut kept = Vec::new();
        for line in preamble.body.lines() {
            let target = if line.trim().is_empty() {
                None
            } else {
                missing
                    .iter()
                    .copied()
                    .find(|idx| template.sections()[*idx].matches_keywords(line))
            };
            match target {
                Some(idx) => buckets[idx].push(line.trim()),
                None => kept.push(line),
            }
        }
        if buckets.iter().all(Vec::is_empty) {
            return Vec::new();
        }

        let filled = buckets
            .iter()
            .enumerate()
            .filter(|(_, lines)| !lines.is_empty())
            .map(|(idx, lines)| (idx, lines.join("\n"), lines.len()))
            .collect::<Vec<_>>();
        (
            preamble.span,
            trim_block(&kept.join("\n")).to_string(),
            filled,
        )
    };

    let mut inferences = Vec::new();
    let mut inserted = Vec::new();
    for (idx, body, lines) in filled {
        let spec = &template.sections()[idx];
        let blank_target = note.sections.iter_mut().find(|section| {
            !section.is_preamble && section.is_blank() && spec.matches_key(&heading_key(&section.name))
        });
        match blank_target {
            Some(section) => section.body = body,
            None => inserted.push(Section {
                name: spec.display_name(),
                body,
                span,
                is_preamble: false,
            }),
        }
        inferences.push(Inference {
            section: spec.name.clone(),
            lines,
        });
    }

    if remaining.is_empty() {
        note.sections.remove(0);
        note.sections.splice(0..0, inserted);
    } else {
        note.sections[0].body = remaining;
        note.sections.splice(1..1, inserted);
    }
    inferences
}

#[cfg(test)]
mod tests {
    use super::infer_sections;
    use crate::parser::Parser;
    use crate::template::builtin::{hp, soap};

    #[test]
    fn moves_keyword_lines_into_missing_soap_sections() {
        let template = soap().expect("soap should build");
        let mut note = Parser::for_template(&template).parse(
            "Chief complaint chest pain\nVitals stable, HR 88\nDiscussed with family\n\nAssessment:\nangina",
        );
        let inferences = infer_sections(&mut note, &template);

        assert_eq!(inferences.len(), 2);
        assert_eq!(inferences[0].section, "Subjective");
        assert_eq!(inferences[1].section, "Objective");
        let shape = note
            .sections
            .iter()
            .map(|section| (section.name.as_str(), section.body.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            shape,
            vec![
                ("Preamble", "Discussed with family"),
                ("Subjective", "Chief complaint chest pain"),
                ("Objective", "Vitals stable, HR 88"),
                ("Assessment", "angina"),
            ]
        );
    }

    #[test]
    fn fills_blank_heading_instead_of_adding_duplicate() {
        let template = soap().expect("soap should build");
        let mut note = Parser::for_template(&template).parse("history of asthma\nSubjective:\n");
        infer_sections(&mut note, &template);
        assert_eq!(note.sections.len(), 1);
        assert_eq!(note.sections[0].name, "Subjective");
        assert_eq!(note.sections[0].body, "history of asthma");
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let template = soap().expect("soap should build");
        let mut note = Parser::for_template(&template).parse("meds: none\nunrelated line");
        infer_sections(&mut note, &template);
        let first = note.clone();
        assert!(infer_sections(&mut note, &template).is_empty());
        assert_eq!(note, first);
    }

    #[test]
    fn templates_without_keywords_are_untouched() {
        let template = hp().expect("hp should build");
        let mut note = Parser::for_template(&template).parse("history of asthma");
        assert!(infer_sections(&mut note, &template).is_empty());
        assert!(note.sections[0].is_preamble);
    }
}

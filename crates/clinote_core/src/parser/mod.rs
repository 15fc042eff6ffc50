//! Note text parser.
//!
//! # Responsibility
//! - Split raw note text into heading-delimited sections.
//! - Re-ingest structured documents previously emitted by the converter.
//!
//! # Invariants
//! - Parsing never fails; malformed input degrades to best-effort sections.
//! - Empty input yields zero sections.
//! - Text before the first heading becomes one preamble section (if non-blank).
//! - Bodies have leading blank lines and trailing whitespace trimmed; interior
//!   blank lines are preserved.

pub mod grammar;
pub mod structured;

use crate::model::note::{ParsedNote, Section, SourceSpan, PREAMBLE_NAME};
use crate::model::template::Template;
use crate::text::trim_block;
use grammar::{classify, LineKind};
use std::collections::BTreeSet;

pub use grammar::HEADING_GRAMMAR_VERSION;

/// Parses text with the structural grammar only (no inline labels).
pub fn parse(text: &str) -> ParsedNote {
    Parser::structural().parse(text)
}

/// Heading parser configured with an inline-label vocabulary.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    inline_vocabulary: BTreeSet<String>,
}

impl Parser {
    /// Parser recognizing only structural headings.
    pub fn structural() -> Self {
        Self::default()
    }

    /// Parser that also accepts `Label: text` for the template's headings.
    pub fn for_template(template: &Template) -> Self {
        let inline_vocabulary = template
            .sections()
            .iter()
            .flat_map(|spec| spec.keys().iter().cloned())
            .collect();
        Self { inline_vocabulary }
    }

    /// Whether `line` would open a section under this parser.
    pub fn is_heading(&self, line: &str) -> bool {
        matches!(
            classify(line, &self.inline_vocabulary),
            LineKind::Heading { .. }
        )
    }

    pub fn parse(&self, text: &str) -> ParsedNote {
        if let Some(note) = structured::parse_structured(text) {
            return note;
        }
        self.parse_text(text)
    }

    fn parse_text(&self, text: &str) -> ParsedNote {
        let mut sections = Vec::new();
        let mut current: Option<SectionBuilder<'_>> = None;
        let mut offset = 0;

        for (idx, raw) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches(['\n', '\r']);
            let line_end = offset + raw.len();

            match classify(line, &self.inline_vocabulary) {
                LineKind::Heading { name, inline_body } => {
                    if let Some(done) = current.take() {
                        sections.extend(done.finish());
                    }
                    let mut builder = SectionBuilder::new(name, false, line_no, offset);
                    if let Some(body) = inline_body {
                        builder.lines.push(body);
                    }
                    builder.extend_to(line_no, line_end);
                    current = Some(builder);
                }
                LineKind::Body => {
                    if current.is_none() {
                        if line.trim().is_empty() {
                            offset = line_end;
                            continue;
                        }
                        current = Some(SectionBuilder::new(
                            PREAMBLE_NAME.to_string(),
                            true,
                            line_no,
                            offset,
                        ));
                    }
                    if let Some(builder) = current.as_mut() {
                        builder.lines.push(line);
                        builder.extend_to(line_no, line_end);
                    }
                }
            }
            offset = line_end;
        }

        if let Some(done) = current.take() {
            sections.extend(done.finish());
        }
        ParsedNote { sections }
    }
}

struct SectionBuilder<'a> {
    name: String,
    is_preamble: bool,
    lines: Vec<&'a str>,
    span: SourceSpan,
}

impl<'a> SectionBuilder<'a> {
    fn new(name: String, is_preamble: bool, start_line: usize, start_byte: usize) -> Self {
        Self {
            name,
            is_preamble,
            lines: Vec::new(),
            span: SourceSpan {
                start_line,
                end_line: start_line,
                start_byte,
                end_byte: start_byte,
            },
        }
    }

    fn extend_to(&mut self, line_no: usize, end_byte: usize) {
        self.span.end_line = line_no;
        self.span.end_byte = end_byte;
    }

    fn finish(self) -> Option<Section> {
        let joined = self.lines.join("\n");
        let body = trim_block(&joined).to_string();
        if self.is_preamble && body.is_empty() {
            return None;
        }
        Some(Section {
            name: self.name,
            body,
            span: self.span,
            is_preamble: self.is_preamble,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, Parser};
    use crate::template::builtin::soap;

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(parse("").is_empty());
        assert!(parse("\n \n\t\n").is_empty());
    }

    #[test]
    fn captures_preamble_and_section_bodies() {
        let note = parse("Seen in clinic.\n\nSubjective:\ncough x3 days\n\n\nworse at night  \n\nPlan:\n");
        let names = note
            .sections
            .iter()
            .map(|section| section.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Preamble", "Subjective", "Plan"]);
        assert!(note.sections[0].is_preamble);
        assert_eq!(note.sections[1].body, "cough x3 days\n\n\nworse at night");
        assert_eq!(note.sections[2].body, "");
    }

    #[test]
    fn spans_cover_heading_through_last_line() {
        let text = "S:\nfeels well\nO:\r\nafebrile\r\n";
        let note = parse(text);
        assert_eq!(note.sections.len(), 2);
        let first = note.sections[0].span;
        assert_eq!((first.start_line, first.end_line), (1, 2));
        assert_eq!(&text[first.start_byte..first.end_byte], "S:\nfeels well\n");
        let second = note.sections[1].span;
        assert_eq!((second.start_line, second.end_line), (3, 4));
        assert_eq!(second.end_byte, text.len());
        assert_eq!(note.sections[1].body, "afebrile");
    }

    #[test]
    fn template_parser_accepts_inline_labels() {
        let template = soap().expect("soap should build");
        let note = Parser::for_template(&template)
            .parse("S: headache since Monday\nmild nausea\nA: migraine\nP: sumatriptan");
        let shape = note
            .sections
            .iter()
            .map(|section| (section.name.as_str(), section.body.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            shape,
            vec![
                ("S", "headache since Monday\nmild nausea"),
                ("A", "migraine"),
                ("P", "sumatriptan"),
            ]
        );
    }

    #[test]
    fn heading_check_follows_template_vocabulary() {
        let template = soap().expect("soap should build");
        let parser = Parser::for_template(&template);
        assert!(parser.is_heading("Assessment: flu"));
        assert!(parser.is_heading("  ## Diet"));
        assert!(!Parser::structural().is_heading("Assessment: flu"));
        assert!(!parser.is_heading("\\Assessment:"));
        assert!(!parser.is_heading("    ## Diet"));
    }

    #[test]
    fn duplicate_headings_are_kept_in_source_order() {
        let note = parse("Plan:\none\nPlan:\ntwo");
        assert_eq!(note.sections.len(), 2);
        assert_eq!(note.sections[1].body, "two");
    }
}

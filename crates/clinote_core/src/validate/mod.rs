//! Schema validation of parsed notes.
//!
//! # Responsibility
//! - Check a parsed note against a template and collect every finding.
//!
//! # Invariants
//! - Never mutates its inputs; identical inputs yield identical reports.
//! - Entries follow template order, then unknown sections in discovery order.
//! - Strict mode promotes every warning to an error; info is never promoted.

use crate::infer::Inference;
use crate::model::note::{ParsedNote, Section};
use crate::model::report::{Issue, IssueKind, ValidationReport};
use crate::model::template::Template;
use crate::text::heading_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
}

/// Validates a parsed note.
///
/// Every required section without a matching heading is reported as
/// `MissingRequiredSection`. The engine may first run keyword inference; for
/// templates that declare keywords (the built-in SOAP template does, for
/// Subjective and Objective) unlabeled preamble text can fill such a section,
/// which is then reported as `InferredSection` info instead.
pub fn validate(note: &ParsedNote, template: &Template, strict: bool) -> ValidationReport {
    validate_with_inferences(note, template, strict, &[])
}

/// Validates a note that went through heuristic inference.
pub fn validate_with_inferences(
    note: &ParsedNote,
    template: &Template,
    strict: bool,
    inferences: &[Inference],
) -> ValidationReport {
    let keyed = note
        .headed_sections()
        .map(|section| (heading_key(&section.name), section))
        .collect::<Vec<_>>();
    let mut findings = Vec::new();

    for spec in template.sections() {
        let matches = keyed
            .iter()
            .filter(|(key, _)| spec.matches_key(key))
            .map(|(_, section)| *section)
            .collect::<Vec<&Section>>();

        if matches.is_empty() {
            if spec.required {
                findings.push((
                    Severity::Error,
                    Issue::new(
                        IssueKind::MissingRequiredSection,
                        spec.name.as_str(),
                        format!("Missing required section: {}", spec.name),
                    ),
                ));
            }
            continue;
        }
        if matches.len() > 1 {
            let spellings = matches
                .iter()
                .map(|section| section.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            findings.push((
                Severity::Warning,
                Issue::new(
                    IssueKind::DuplicateSection,
                    spec.name.as_str(),
                    format!(
                        "Section {} appears {} times ({spellings})",
                        spec.name,
                        matches.len()
                    ),
                ),
            ));
        }
        if matches.iter().all(|section| section.is_blank()) {
            findings.push((
                Severity::Warning,
                Issue::new(
                    IssueKind::EmptySection,
                    spec.name.as_str(),
                    format!("Section {} is empty", spec.name),
                ),
            ));
        }
    }

    for (key, section) in &keyed {
        if template.position_of_key(key).is_none() {
            findings.push((
                Severity::Warning,
                Issue::new(
                    IssueKind::UnknownSection,
                    section.name.as_str(),
                    format!(
                        "Unknown section: {} (not part of template {})",
                        section.name,
                        template.id()
                    ),
                ),
            ));
        }
    }

    let info = inferences
        .iter()
        .map(|inference| {
            Issue::new(
                IssueKind::InferredSection,
                inference.section.as_str(),
                format!(
                    "Section {} inferred from {} unlabeled line(s)",
                    inference.section, inference.lines
                ),
            )
        })
        .collect();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for (severity, issue) in findings {
        if severity == Severity::Error || strict {
            errors.push(issue);
        } else {
            warnings.push(issue);
        }
    }
    ValidationReport::build(template.id(), strict, errors, warnings, info)
}

#[cfg(test)]
mod tests {
    use super::{validate, validate_with_inferences};
    use crate::infer::Inference;
    use crate::model::report::IssueKind;
    use crate::parser::{parse, Parser};
    use crate::template::builtin::soap;
    use crate::template::definition::parse_inline;

    #[test]
    fn empty_note_reports_each_required_section_once() {
        let template = soap().expect("soap should build");
        let report = validate(&parse(""), &template, false);
        let missing = report
            .errors
            .iter()
            .map(|issue| (issue.kind, issue.section.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            missing,
            vec![
                (IssueKind::MissingRequiredSection, Some("Subjective")),
                (IssueKind::MissingRequiredSection, Some("Objective")),
                (IssueKind::MissingRequiredSection, Some("Assessment")),
                (IssueKind::MissingRequiredSection, Some("Plan")),
            ]
        );
        assert!(report.warnings.is_empty());
        assert!(!report.is_valid);
    }

    #[test]
    fn warnings_follow_template_then_discovery_order() {
        let template = parse_inline("sections: A, B?")
            .expect("should look inline")
            .expect("should build");
        let note = parse("Zeta:\nz\nB:\n\nA:\none\nAlpha:\nx\na:\ntwo");
        let report = validate(&note, &template, false);

        assert!(report.is_valid);
        let kinds = report
            .warnings
            .iter()
            .map(|issue| (issue.kind, issue.section.clone().unwrap_or_default()))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                (IssueKind::DuplicateSection, "A".to_string()),
                (IssueKind::EmptySection, "B".to_string()),
                (IssueKind::UnknownSection, "Zeta".to_string()),
                (IssueKind::UnknownSection, "Alpha".to_string()),
            ]
        );
    }

    #[test]
    fn strict_mode_promotes_warnings_but_not_info() {
        let template = soap().expect("soap should build");
        let note = Parser::for_template(&template)
            .parse("S: ok\nO: ok\nA: ok\nP: ok\nSocial:\nlives alone");
        let inferences = vec![Inference {
            section: "Subjective".to_string(),
            lines: 1,
        }];

        let lenient = validate_with_inferences(&note, &template, false, &inferences);
        assert!(lenient.is_valid);
        assert_eq!(lenient.warnings_of(IssueKind::UnknownSection).count(), 1);

        let strict = validate_with_inferences(&note, &template, true, &inferences);
        assert!(!strict.is_valid);
        assert_eq!(strict.errors_of(IssueKind::UnknownSection).count(), 1);
        assert!(strict.warnings.is_empty());
        assert_eq!(strict.info.len(), 1);
        assert_eq!(strict.info[0].kind, IssueKind::InferredSection);
    }

    #[test]
    fn preamble_is_not_an_unknown_section() {
        let template = soap().expect("soap should build");
        let report = validate(&parse("free text only"), &template, true);
        assert_eq!(report.errors.len(), 4);
        assert!(report
            .errors
            .iter()
            .all(|issue| issue.kind == IssueKind::MissingRequiredSection));
    }
}

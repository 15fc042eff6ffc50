//! Re-ingest of converter output (JSON documents and CSV tables).
//!
//! Structured input carries no source positions, so spans are left zeroed.
//! A document is only accepted when every section name has a non-empty
//! heading key; otherwise the text is parsed as prose.

use crate::model::note::{ParsedNote, Section, SourceSpan, PREAMBLE_NAME};
use crate::render::document::{RenderedDocument, CSV_HEADER, DOCUMENT_FORMAT_VERSION};
use crate::text::{heading_key, trim_block};

/// Returns sections when `text` is a document emitted by the converter.
pub fn parse_structured(text: &str) -> Option<ParsedNote> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return parse_json_document(trimmed);
    }
    if trimmed.starts_with(CSV_HEADER) {
        return parse_csv_document(trimmed);
    }
    None
}

/// Whether `text` would be re-ingested as a converter document.
pub fn looks_structured(text: &str) -> bool {
    parse_structured(text).is_some()
}

fn parse_json_document(text: &str) -> Option<ParsedNote> {
    let document = serde_json::from_str::<RenderedDocument>(text).ok()?;
    if document.format_version != DOCUMENT_FORMAT_VERSION {
        return None;
    }

    let mut sections = Vec::new();
    if let Some(preamble) = document.preamble.as_deref() {
        push_preamble(&mut sections, preamble);
    }
    for section in document.sections {
        sections.push(headed(section.name, &section.content)?);
    }
    Some(ParsedNote { sections })
}

fn parse_csv_document(text: &str) -> Option<ParsedNote> {
    let records = read_csv(text)?;
    let (header, rows) = records.split_first()?;
    if header.len() != 2 || header.join(",") != CSV_HEADER {
        return None;
    }

    let mut sections = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let [name, content] = row.as_slice() else {
            return None;
        };
        if name.is_empty() {
            if idx != 0 {
                return None;
            }
            push_preamble(&mut sections, content);
        } else {
            sections.push(headed(name.clone(), content)?);
        }
    }
    Some(ParsedNote { sections })
}

fn push_preamble(sections: &mut Vec<Section>, body: &str) {
    let body = trim_block(body);
    if body.is_empty() {
        return;
    }
    sections.push(Section {
        name: PREAMBLE_NAME.to_string(),
        body: body.to_string(),
        span: SourceSpan::default(),
        is_preamble: true,
    });
}

fn headed(name: String, body: &str) -> Option<Section> {
    if heading_key(&name).is_empty() {
        return None;
    }
    Some(Section {
        name,
        body: trim_block(body).to_string(),
        span: SourceSpan::default(),
        is_preamble: false,
    })
}

/// Minimal RFC 4180 reader; `None` on unterminated quotes or stray quotes.
fn read_csv(text: &str) -> Option<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() && !field_was_quoted => {
                in_quotes = true;
                field_was_quoted = true;
            }
            '"' => return None,
            ',' => {
                record.push(std::mem::take(&mut field));
                field_was_quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                field_was_quoted = false;
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return None;
    }
    if !field.is_empty() || field_was_quoted || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Some(records)
}

#[cfg(test)]
mod tests {
    use super::{looks_structured, parse_structured, read_csv};

    #[test]
    fn reads_quoted_fields_with_newlines_and_escapes() {
        let records = read_csv("section,content\r\nPlan,\"a, \"\"b\"\"\nc\"\n").expect("valid csv");
        assert_eq!(
            records,
            vec![
                vec!["section".to_string(), "content".to_string()],
                vec!["Plan".to_string(), "a, \"b\"\nc".to_string()],
            ]
        );
        assert!(read_csv("a,\"open").is_none());
    }

    #[test]
    fn ingests_csv_with_leading_preamble_row() {
        let note = parse_structured("section,content\n,intro\nPlan,rest\n").expect("csv document");
        assert!(note.sections[0].is_preamble);
        assert_eq!(note.sections[1].name, "Plan");
    }

    #[test]
    fn rejects_documents_with_unusable_section_names() {
        assert!(parse_structured("section,content\n!!!,body\n").is_none());
        assert!(parse_structured(
            r#"{"format_version":1,"template":"soap","preamble":null,"sections":[{"name":"  ","content":"x"}]}"#
        )
        .is_none());
        assert!(looks_structured("section,content"));
        assert!(!looks_structured("\\section,content"));
    }

    #[test]
    fn ignores_arbitrary_json_and_prose() {
        assert!(parse_structured("{\"hello\": 1}").is_none());
        assert!(parse_structured("Plan:\nrest").is_none());
    }
}

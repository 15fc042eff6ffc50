//! Heading grammar (version [`HEADING_GRAMMAR_VERSION`]).
//!
//! A line is a heading when it is one of:
//! 1. an ATX heading: `## Title` (closing `#`s and a trailing `:` dropped);
//! 2. a bold label alone on the line: `**Title**` or `**Title:**`;
//! 3. a label alone on the line: `Title:` (starts with a letter, at most
//!    [`MAX_LABEL_WORDS`] words);
//! 4. an inline label `Title: text` whose heading key is in the active
//!    vocabulary; `text` becomes the first body line.
//!
//! A candidate whose heading key is empty is body text.

use crate::text::{collapse_whitespace, heading_key};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Version of the heading grammar contract.
pub const HEADING_GRAMMAR_VERSION: u32 = 1;

pub const MAX_LABEL_WORDS: usize = 6;

static ATX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid atx regex")
});
static BOLD_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\*\*([^*]+?)\*\*[ \t]*:?[ \t]*$").expect("valid bold label regex")
});
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*([A-Za-z][A-Za-z0-9 &/()'.,\-]{0,59}?)[ \t]*:[ \t]*$")
        .expect("valid label regex")
});
static LABEL_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9 &/()'.,\-]{0,59}$").expect("valid label name regex")
});
static INLINE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[ \t]*(?:\*\*)?([A-Za-z][A-Za-z0-9 &/\-]{0,39}?)(?:\*\*)?[ \t]*:(?:\*\*)?[ \t]+(\S.*)$",
    )
    .expect("valid inline label regex")
});

/// Classification of one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Heading {
        name: String,
        inline_body: Option<&'a str>,
    },
    Body,
}

/// Classifies one line (without its terminator).
pub fn classify<'a>(line: &'a str, inline_vocabulary: &BTreeSet<String>) -> LineKind<'a> {
    if let Some(caps) = ATX_RE.captures(line) {
        return heading_or_body(&caps[1], None);
    }
    if let Some(caps) = BOLD_LABEL_RE.captures(line) {
        return heading_or_body(&caps[1], None);
    }
    if let Some(caps) = LABEL_RE.captures(line) {
        let name = &caps[1];
        if name.split_whitespace().count() <= MAX_LABEL_WORDS {
            return heading_or_body(name, None);
        }
        return LineKind::Body;
    }
    if !inline_vocabulary.is_empty() {
        if let Some(caps) = INLINE_LABEL_RE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            if inline_vocabulary.contains(&heading_key(name)) {
                let inline_body = caps.get(2).map(|m| m.as_str());
                return heading_or_body(name, inline_body);
            }
        }
    }
    LineKind::Body
}

/// Canonical spelling of a heading name: whitespace collapsed, trailing
/// `#`, `:` and spaces removed.
pub fn canonical_heading(name: &str) -> String {
    collapse_whitespace(name)
        .trim_end_matches(|c: char| c == '#' || c == ':' || c.is_whitespace())
        .to_string()
}

/// Whether `name` re-parses as a bare `Name:` label line.
pub fn fits_label(name: &str) -> bool {
    LABEL_NAME_RE.is_match(name)
        && name.split_whitespace().count() <= MAX_LABEL_WORDS
        && !name.ends_with(' ')
}

fn heading_or_body<'a>(raw_name: &str, inline_body: Option<&'a str>) -> LineKind<'a> {
    let name = canonical_heading(raw_name);
    if heading_key(&name).is_empty() {
        return LineKind::Body;
    }
    LineKind::Heading { name, inline_body }
}

#[cfg(test)]
mod tests {
    use super::{canonical_heading, classify, fits_label, LineKind};
    use std::collections::BTreeSet;

    fn heading(name: &str) -> LineKind<'static> {
        LineKind::Heading {
            name: name.to_string(),
            inline_body: None,
        }
    }

    #[test]
    fn recognizes_structural_headings() {
        let none = BTreeSet::new();
        assert_eq!(classify("## Plan ##", &none), heading("Plan"));
        assert_eq!(classify("# Assessment:", &none), heading("Assessment"));
        assert_eq!(classify("**Objective:**", &none), heading("Objective"));
        assert_eq!(classify("Past Medical History:", &none), heading("Past Medical History"));
        assert_eq!(classify("  S:  ", &none), heading("S"));
    }

    #[test]
    fn rejects_prose_and_hashtags() {
        let none = BTreeSet::new();
        assert_eq!(classify("#hashtag", &none), LineKind::Body);
        assert_eq!(classify("BP: 120/80", &none), LineKind::Body);
        assert_eq!(
            classify("The patient was seen today and she said:", &none),
            LineKind::Body
        );
        assert_eq!(classify("## ---", &none), LineKind::Body);
    }

    #[test]
    fn inline_labels_need_vocabulary() {
        let vocabulary = BTreeSet::from(["assessment".to_string(), "a".to_string()]);
        assert_eq!(
            classify("Assessment: stable angina", &vocabulary),
            LineKind::Heading {
                name: "Assessment".to_string(),
                inline_body: Some("stable angina"),
            }
        );
        assert_eq!(
            classify("**A:** improving", &vocabulary),
            LineKind::Heading {
                name: "A".to_string(),
                inline_body: Some("improving"),
            }
        );
        assert_eq!(classify("BP: 120/80", &vocabulary), LineKind::Body);
    }

    #[test]
    fn canonical_heading_is_stable_under_label_rendering() {
        for raw in ["Vitals (24h) #", "Plan:", "  Follow   Up  "] {
            let name = canonical_heading(raw);
            assert_eq!(canonical_heading(&name), name);
        }
        assert!(fits_label("Follow Up"));
        assert!(!fits_label("Vitals #1"));
        assert!(!fits_label("one two three four five six seven"));
    }
}

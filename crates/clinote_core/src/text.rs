//! Small text helpers shared by parser, normalizer and preview.

/// Reduces a heading to its matching key.
///
/// Rules:
/// - surrounding whitespace and one trailing `:` are dropped;
/// - `-`, `/` and `&` count as word separators;
/// - only ASCII alphanumerics survive, lowercased;
/// - whitespace runs collapse to one space.
pub fn heading_key(input: &str) -> String {
    let cleaned = input.trim().trim_end_matches(':');
    let mut out = String::with_capacity(cleaned.len());
    let mut pending_space = false;
    for ch in cleaned.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || matches!(ch, '-' | '/' | '&') {
            pending_space = true;
        }
    }
    out
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count()
}

/// Truncates on a char boundary, appending `...` when shortened.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    let mut out = input.chars().take(max_chars).collect::<String>();
    if input.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

/// Trims leading blank lines and trailing whitespace, keeping interior blank lines.
pub fn trim_block(input: &str) -> &str {
    let trimmed_end = input.trim_end();
    let mut start = 0;
    for line in trimmed_end.split_inclusive('\n') {
        if line.trim().is_empty() {
            start += line.len();
        } else {
            break;
        }
    }
    &trimmed_end[start..]
}

#[cfg(test)]
mod tests {
    use super::{heading_key, trim_block, truncate_chars};

    #[test]
    fn heading_key_ignores_case_punctuation_and_separators() {
        assert_eq!(heading_key("  History-of  Present/Illness: "), "history of present illness");
        assert_eq!(heading_key("H&P"), "h p");
        assert_eq!(heading_key("Follow-up"), "follow up");
        assert_eq!(heading_key("(Vitals)"), "vitals");
        assert_eq!(heading_key(":::"), "");
    }

    #[test]
    fn trim_block_keeps_interior_blank_lines() {
        assert_eq!(trim_block("\n  \nfirst\n\nsecond  \n\n"), "first\n\nsecond");
        assert_eq!(trim_block("   "), "");
    }

    #[test]
    fn truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("température", 4), "temp...");
        assert_eq!(truncate_chars("ok", 4), "ok");
    }
}

//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note operations to Dart via FRB as plain envelopes.
//! - Map core errors to stable `error_kind` codes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Note operations require `init_engine`; before that they return an
//!   envelope with `error_kind = "not_initialized"`.
//! - `ping`, `core_version` and `default_format` never fail.

use clinote_core::{
    core_version as core_version_inner, default_format as default_format_inner,
    engine as engine_inner, init_engine as init_engine_inner, init_logging as init_logging_inner,
    ping as ping_inner, Engine, EngineConfig, Issue, NoteResult, SectionPreview, Stats,
    ValidationReport,
};
use log::warn;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking; works before `init_engine`.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Identifier of the default template (`soap`); constant per process.
#[flutter_rust_bridge::frb(sync)]
pub fn default_format() -> String {
    default_format_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Initializes the note engine from `CLINOTE_*` environment variables.
///
/// # FFI contract
/// - Idempotent; must run before any note operation.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_engine() -> String {
    match EngineConfig::from_env().and_then(init_engine_inner) {
        Ok(_) => String::new(),
        Err(err) => {
            warn!(
                "event=ffi_init_engine module=ffi status=error error_kind={}",
                err.code()
            );
            err.to_string()
        }
    }
}

/// Text result envelope (`convert`, `normalize`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub ok: bool,
    /// Output text; empty on failure.
    pub text: String,
    /// Human-readable diagnostics; empty on success.
    pub message: String,
    /// Stable error code (`unknown_template`, `validation_failed`, ...).
    pub error_kind: Option<String>,
    /// Validation issues when conversion was rejected in strict mode.
    pub issues: Vec<IssueItem>,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueItem {
    /// `missing_required_section|unknown_section|duplicate_section|empty_section|inferred_section`.
    pub kind: String,
    /// `error|warning|info`.
    pub severity: String,
    pub section: Option<String>,
    pub message: String,
}

/// Validation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    pub ok: bool,
    pub template: String,
    pub strict: bool,
    pub is_valid: bool,
    /// Errors, then warnings, then info; each group in report order.
    pub issues: Vec<IssueItem>,
    pub message: String,
    pub error_kind: Option<String>,
}

/// Per-section statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionStatsItem {
    pub name: String,
    pub word_count: u32,
    pub line_count: u32,
}

/// Normalize-with-stats envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeStatsResponse {
    pub ok: bool,
    pub normalized: String,
    pub section_count: u32,
    pub word_count: u32,
    pub sections: Vec<SectionStatsItem>,
    pub missing_required: Vec<String>,
    pub has_preamble: bool,
    pub removed_empty_sections: u32,
    pub merged_duplicates: u32,
    pub inferred_lines: u32,
    pub message: String,
    pub error_kind: Option<String>,
}

/// One preview row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPreviewItem {
    pub name: String,
    pub present: bool,
    pub snippet: String,
    pub line_count: u32,
    pub char_count: u32,
}

/// Preview envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResponse {
    pub ok: bool,
    pub items: Vec<SectionPreviewItem>,
    pub message: String,
    pub error_kind: Option<String>,
}

/// Converts note text into `output_format` (`plain|markdown|json|csv`).
///
/// # FFI contract
/// - Sync call, CPU-bound and linear in input size.
/// - Never panics; strict rejections carry the issues that caused them.
#[flutter_rust_bridge::frb(sync)]
pub fn convert(
    note_text: String,
    template: String,
    output_format: String,
    strict: bool,
) -> TextResponse {
    let result = with_engine(|engine| engine.convert(&note_text, &template, &output_format, strict));
    match result {
        Ok(text) => TextResponse {
            ok: true,
            text,
            message: String::new(),
            error_kind: None,
            issues: Vec::new(),
        },
        Err(err) => {
            let issues = err.report().map(report_issues).unwrap_or_default();
            TextResponse {
                ok: false,
                text: String::new(),
                message: err.to_string(),
                error_kind: Some(err.code().to_string()),
                issues,
            }
        }
    }
}

/// Normalizes note text into canonical plain text.
#[flutter_rust_bridge::frb(sync)]
pub fn normalize(note_text: String, template: String) -> TextResponse {
    match with_engine(|engine| engine.normalize(&note_text, &template)) {
        Ok(text) => TextResponse {
            ok: true,
            text,
            message: String::new(),
            error_kind: None,
            issues: Vec::new(),
        },
        Err(err) => TextResponse {
            ok: false,
            text: String::new(),
            message: err.to_string(),
            error_kind: Some(err.code().to_string()),
            issues: Vec::new(),
        },
    }
}

/// Normalizes note text and returns statistics over the normalized result.
#[flutter_rust_bridge::frb(sync)]
pub fn normalize_with_stats(note_text: String, template: String) -> NormalizeStatsResponse {
    match with_engine(|engine| engine.normalize_with_stats(&note_text, &template)) {
        Ok(output) => stats_response(output.normalized, output.stats),
        Err(err) => {
            let mut response = stats_response(String::new(), Stats::default());
            response.ok = false;
            response.message = err.to_string();
            response.error_kind = Some(err.code().to_string());
            response
        }
    }
}

/// Validates note text against a template.
#[flutter_rust_bridge::frb(sync)]
pub fn validate(note_text: String, template: String, strict: bool) -> ValidationResponse {
    match with_engine(|engine| engine.validate(&note_text, &template, strict)) {
        Ok(report) => ValidationResponse {
            ok: true,
            template: report.template.clone(),
            strict: report.strict,
            is_valid: report.is_valid,
            issues: report_issues(&report),
            message: String::new(),
            error_kind: None,
        },
        Err(err) => ValidationResponse {
            ok: false,
            template: String::new(),
            strict,
            is_valid: false,
            issues: Vec::new(),
            message: err.to_string(),
            error_kind: Some(err.code().to_string()),
        },
    }
}

/// Lists template sections with presence flags and short snippets.
#[flutter_rust_bridge::frb(sync)]
pub fn preview_sections(note_text: String, template: String) -> PreviewResponse {
    match with_engine(|engine| engine.preview_sections(&note_text, &template)) {
        Ok(previews) => PreviewResponse {
            ok: true,
            items: previews.into_iter().map(to_preview_item).collect(),
            message: String::new(),
            error_kind: None,
        },
        Err(err) => PreviewResponse {
            ok: false,
            items: Vec::new(),
            message: err.to_string(),
            error_kind: Some(err.code().to_string()),
        },
    }
}

fn with_engine<T>(f: impl FnOnce(&Engine) -> NoteResult<T>) -> NoteResult<T> {
    let engine = engine_inner()?;
    f(engine)
}

fn report_issues(report: &ValidationReport) -> Vec<IssueItem> {
    let errors = report.errors.iter().map(|issue| to_issue_item(issue, "error"));
    let warnings = report
        .warnings
        .iter()
        .map(|issue| to_issue_item(issue, "warning"));
    let info = report.info.iter().map(|issue| to_issue_item(issue, "info"));
    errors.chain(warnings).chain(info).collect()
}

fn to_issue_item(issue: &Issue, severity: &str) -> IssueItem {
    IssueItem {
        kind: issue.kind.as_str().to_string(),
        severity: severity.to_string(),
        section: issue.section.clone(),
        message: issue.message.clone(),
    }
}

fn stats_response(normalized: String, stats: Stats) -> NormalizeStatsResponse {
    NormalizeStatsResponse {
        ok: true,
        normalized,
        section_count: to_u32(stats.section_count),
        word_count: to_u32(stats.word_count),
        sections: stats
            .sections
            .into_iter()
            .map(|section| SectionStatsItem {
                name: section.name,
                word_count: to_u32(section.word_count),
                line_count: to_u32(section.line_count),
            })
            .collect(),
        missing_required: stats.missing_required,
        has_preamble: stats.has_preamble,
        removed_empty_sections: to_u32(stats.removed_empty_sections),
        merged_duplicates: to_u32(stats.merged_duplicates),
        inferred_lines: to_u32(stats.inferred_lines),
        message: String::new(),
        error_kind: None,
    }
}

fn to_preview_item(preview: SectionPreview) -> SectionPreviewItem {
    SectionPreviewItem {
        name: preview.name,
        present: preview.present,
        snippet: preview.snippet,
        line_count: to_u32(preview.line_count),
        char_count: to_u32(preview.char_count),
    }
}

// Counts cross the boundary as u32; saturate instead of wrapping.
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        convert, core_version, default_format, init_engine, init_logging, normalize,
        normalize_with_stats, ping, preview_sections, validate,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn default_format_is_soap() {
        assert_eq!(default_format(), "soap");
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn note_operations_round_trip_through_envelopes() {
        assert_eq!(init_engine(), "");
        assert_eq!(init_engine(), "");

        let converted = convert(
            "P: rest\nA: flu".to_string(),
            "soap".to_string(),
            "md".to_string(),
            false,
        );
        assert!(converted.ok, "{}", converted.message);
        assert_eq!(converted.text, "## Assessment\n\nflu\n\n## Plan\n\nrest");

        let rejected = convert(
            "P: rest".to_string(),
            "soap".to_string(),
            "plain".to_string(),
            true,
        );
        assert!(!rejected.ok);
        assert_eq!(rejected.error_kind.as_deref(), Some("validation_failed"));
        assert_eq!(rejected.issues.len(), 3);
        assert!(rejected.issues.iter().all(|issue| issue.severity == "error"));

        let unsupported = convert(
            String::new(),
            "soap".to_string(),
            "pdf".to_string(),
            false,
        );
        assert_eq!(unsupported.error_kind.as_deref(), Some("unsupported_format"));

        let normalized = normalize("B:\n2\nA:\n1".to_string(), "sections: A, B".to_string());
        assert_eq!(normalized.text, "A:\n1\n\nB:\n2");

        let stats = normalize_with_stats("A:\none two".to_string(), "sections: A, B?".to_string());
        assert!(stats.ok);
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.sections[0].name, "A");

        let report = validate(String::new(), "nonexistent-template".to_string(), false);
        assert!(!report.ok);
        assert_eq!(report.error_kind.as_deref(), Some("unknown_template"));

        let report = validate("Extra:\nx".to_string(), "sections: A?".to_string(), true);
        assert!(report.ok);
        assert!(!report.is_valid);
        assert_eq!(report.issues[0].kind, "unknown_section");

        let previews = preview_sections("A:\nhello".to_string(), "sections: A, B?".to_string());
        assert_eq!(previews.items.len(), 2);
        assert!(previews.items[0].present);
        assert!(!previews.items[1].present);
    }
}

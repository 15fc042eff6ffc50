//! Note engine: the operations exposed to boundary layers.
//!
//! # Responsibility
//! - Run the parse -> infer -> validate -> normalize -> render pipeline.
//! - Own the template registry and configuration for the process lifetime.
//!
//! # Invariants
//! - Every operation is a pure function of its inputs plus immutable state.
//! - Template and output format are resolved before any text is parsed.
//! - Log events carry metadata only; note text never reaches the logs.

use crate::bundle::{join_notes, split_bundle, BundleReport, NotePreview};
use crate::config::EngineConfig;
use crate::error::{NoteError, NoteResult};
use crate::infer::{infer_sections, Inference};
use crate::model::note::ParsedNote;
use crate::model::report::ValidationReport;
use crate::model::stats::Stats;
use crate::model::template::Template;
use crate::normalize::normalize_note;
use crate::parser::Parser;
use crate::preview::{preview_sections, SectionPreview};
use crate::render::{render, OutputFormat};
use crate::template::builtin::DEFAULT_TEMPLATE_ID;
use crate::template::registry::TemplateRegistry;
use crate::validate::validate_with_inferences;
use log::{debug, info, warn};
use std::sync::Arc;

/// Result of [`Engine::normalize_with_stats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOutput {
    pub normalized: String,
    pub stats: Stats,
}

struct Prepared {
    template: Arc<Template>,
    note: ParsedNote,
    inferences: Vec<Inference>,
}

impl Prepared {
    fn inferred_lines(&self) -> usize {
        self.inferences.iter().map(|inference| inference.lines).sum()
    }
}

/// Read-only note engine.
#[derive(Debug)]
pub struct Engine {
    registry: TemplateRegistry,
    config: EngineConfig,
}

impl Engine {
    /// Builds an engine with the built-in templates plus configured ones.
    ///
    /// # Errors
    /// - `Config` when the configuration is out of range or a configured
    ///   template is invalid or collides with a registered name.
    pub fn new(config: EngineConfig) -> NoteResult<Self> {
        config.validate()?;
        let mut registry = TemplateRegistry::with_builtins()
            .map_err(|err| NoteError::Internal(err.to_string()))?;
        for definition in &config.templates {
            registry
                .register_definition(definition)
                .map_err(|err| NoteError::Config(err.to_string()))?;
        }
        info!(
            "event=engine_init module=engine status=ok templates={} heuristics={}",
            registry.len(),
            config.apply_heuristics
        );
        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Identifier of the default template.
    pub fn default_format(&self) -> &'static str {
        DEFAULT_TEMPLATE_ID
    }

    /// Resolves a template name or inline definition.
    pub fn resolve(&self, template: &str) -> NoteResult<Arc<Template>> {
        self.registry.resolve(template)
    }

    /// Validates note text against a template.
    ///
    /// With heuristics enabled, sections filled by keyword inference count as
    /// present in lenient and strict mode alike.
    ///
    /// # Errors
    /// - `UnknownTemplate` when `template` cannot be resolved.
    pub fn validate(&self, text: &str, template: &str, strict: bool) -> NoteResult<ValidationReport> {
        let prepared = self.prepare(text, template)?;
        let report = validate_with_inferences(
            &prepared.note,
            &prepared.template,
            strict,
            &prepared.inferences,
        );
        debug!(
            "event=note_validate module=engine status=ok template={} strict={} valid={} errors={} warnings={}",
            report.template,
            strict,
            report.is_valid,
            report.errors.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Normalizes note text into canonical plain text.
    ///
    /// # Errors
    /// - `UnknownTemplate` when `template` cannot be resolved.
    pub fn normalize(&self, text: &str, template: &str) -> NoteResult<String> {
        let prepared = self.prepare(text, template)?;
        Ok(normalize_note(&prepared.note, &prepared.template).to_text())
    }

    /// Normalizes note text and computes statistics over the result.
    pub fn normalize_with_stats(&self, text: &str, template: &str) -> NoteResult<NormalizeOutput> {
        let prepared = self.prepare(text, template)?;
        let normalized = normalize_note(&prepared.note, &prepared.template);
        let stats = normalized.stats(prepared.inferred_lines());
        debug!(
            "event=note_normalize module=engine status=ok template={} sections={} merged={} removed={}",
            normalized.template,
            stats.section_count,
            stats.merged_duplicates,
            stats.removed_empty_sections
        );
        Ok(NormalizeOutput {
            normalized: normalized.to_text(),
            stats,
        })
    }

    /// Converts note text into `output_format`.
    ///
    /// # Errors
    /// - `UnknownTemplate` / `UnsupportedFormat` for bad arguments.
    /// - `ValidationFailed` (with the full report) when `strict` is set and
    ///   the note does not validate.
    pub fn convert(
        &self,
        text: &str,
        template: &str,
        output_format: &str,
        strict: bool,
    ) -> NoteResult<String> {
        let template = self.resolve(template)?;
        let format = OutputFormat::parse(output_format)?;
        let prepared = self.prepare_resolved(text, template);
        let report = validate_with_inferences(
            &prepared.note,
            &prepared.template,
            strict,
            &prepared.inferences,
        );
        if strict && !report.is_valid {
            warn!(
                "event=note_convert module=engine status=rejected template={} format={} errors={}",
                report.template,
                format.as_str(),
                report.errors.len()
            );
            return Err(NoteError::ValidationFailed(Box::new(report)));
        }

        let normalized = normalize_note(&prepared.note, &prepared.template);
        let output = render(&normalized, format)?;
        debug!(
            "event=note_convert module=engine status=ok template={} format={} sections={} valid={}",
            normalized.template,
            format.as_str(),
            normalized.sections.len(),
            report.is_valid
        );
        Ok(output)
    }

    /// Builds per-section previews.
    pub fn preview_sections(&self, text: &str, template: &str) -> NoteResult<Vec<SectionPreview>> {
        let prepared = self.prepare(text, template)?;
        Ok(preview_sections(
            &prepared.note,
            &prepared.template,
            self.config.preview_chars,
        ))
    }

    /// Normalizes every note of a `---` separated bundle.
    ///
    /// Notes that normalize to nothing are dropped from the output.
    pub fn normalize_bundle(&self, text: &str, template: &str) -> NoteResult<String> {
        let template = self.resolve(template)?;
        let notes = split_bundle(text);
        let count = notes.len();
        let normalized = notes.into_iter().map(|note| {
            let prepared = self.prepare_resolved(note, Arc::clone(&template));
            normalize_note(&prepared.note, &prepared.template).to_text()
        });
        let output = join_notes(normalized);
        debug!(
            "event=bundle_normalize module=engine status=ok template={} notes={}",
            template.id(),
            count
        );
        Ok(output)
    }

    /// Validates every note of a bundle; indices in the result are 1-based.
    pub fn validate_bundle(
        &self,
        text: &str,
        template: &str,
        strict: bool,
    ) -> NoteResult<BundleReport> {
        let template = self.resolve(template)?;
        let reports = split_bundle(text)
            .into_iter()
            .map(|note| {
                let prepared = self.prepare_resolved(note, Arc::clone(&template));
                validate_with_inferences(
                    &prepared.note,
                    &prepared.template,
                    strict,
                    &prepared.inferences,
                )
            })
            .collect::<Vec<_>>();
        let report = BundleReport::build(template.id(), strict, reports);
        debug!(
            "event=bundle_validate module=engine status=ok template={} strict={} notes={} valid={}",
            report.template,
            strict,
            report.notes.len(),
            report.is_valid
        );
        Ok(report)
    }

    /// Builds section previews for every note of a bundle.
    pub fn preview_bundle(&self, text: &str, template: &str) -> NoteResult<Vec<NotePreview>> {
        let template = self.resolve(template)?;
        Ok(split_bundle(text)
            .into_iter()
            .enumerate()
            .map(|(idx, note)| {
                let prepared = self.prepare_resolved(note, Arc::clone(&template));
                NotePreview {
                    note_index: idx + 1,
                    sections: preview_sections(
                        &prepared.note,
                        &prepared.template,
                        self.config.preview_chars,
                    ),
                }
            })
            .collect())
    }

    fn prepare(&self, text: &str, template: &str) -> NoteResult<Prepared> {
        let template = self.resolve(template)?;
        Ok(self.prepare_resolved(text, template))
    }

    fn prepare_resolved(&self, text: &str, template: Arc<Template>) -> Prepared {
        let mut note = Parser::for_template(&template).parse(text);
        let inferences = if self.config.apply_heuristics {
            infer_sections(&mut note, &template)
        } else {
            Vec::new()
        };
        if !inferences.is_empty() {
            debug!(
                "event=note_infer module=engine status=ok template={} sections={}",
                template.id(),
                inferences.len()
            );
        }
        Prepared {
            template,
            note,
            inferences,
        }
    }
}

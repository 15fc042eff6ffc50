//! Core domain logic for clinote.
//! This crate is the single source of truth for note-processing invariants.

pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod infer;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod preview;
pub mod render;
pub mod runtime;
pub mod template;
pub mod text;
pub mod validate;

pub use bundle::{split_bundle, BundleReport, NotePreview, NoteReport};
pub use config::EngineConfig;
pub use engine::{Engine, NormalizeOutput};
pub use error::{NoteError, NoteResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::note::{ParsedNote, Section, SourceSpan};
pub use model::report::{Issue, IssueKind, ValidationReport};
pub use model::stats::{SectionStats, Stats};
pub use model::template::{FormatRule, HeadingCase, SectionSpec, Template, TemplateError};
pub use parser::{parse, Parser, HEADING_GRAMMAR_VERSION};
pub use preview::SectionPreview;
pub use render::OutputFormat;
pub use runtime::{engine, init_engine, is_initialized};
pub use template::definition::{SectionDefinition, TemplateDefinition};
pub use template::registry::{RegistryError, TemplateRegistry};
pub use template::TEMPLATE_SCHEMA_VERSION;

/// Minimal health-check API; works without an initialized engine.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Identifier of the built-in default template; constant for the process.
pub fn default_format() -> &'static str {
    template::builtin::DEFAULT_TEMPLATE_ID
}

//! Engine configuration.
//!
//! # Responsibility
//! - Hold the process-lifetime settings of the engine.
//! - Load overrides from environment variables and a templates file.
//!
//! # Invariants
//! - Defaults are valid on their own; every override is validated on load.

use crate::error::{NoteError, NoteResult};
use crate::template::definition::TemplateDefinition;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable names.
pub mod env_vars {
    /// `true`/`false` (also `1`/`0`, `yes`/`no`, `on`/`off`).
    pub const HEURISTICS: &str = "CLINOTE_HEURISTICS";
    pub const PREVIEW_CHARS: &str = "CLINOTE_PREVIEW_CHARS";
    /// Path to a JSON array of template definitions.
    pub const TEMPLATES_FILE: &str = "CLINOTE_TEMPLATES_FILE";
}

pub mod defaults {
    pub const APPLY_HEURISTICS: bool = true;
    pub const PREVIEW_CHARS: usize = 80;
    pub const MAX_PREVIEW_CHARS: usize = 4096;
}

/// Settings fixed at engine initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Move unlabeled preamble lines into missing sections by keyword.
    pub apply_heuristics: bool,
    /// Maximum snippet length (chars) returned by previews.
    pub preview_chars: usize,
    /// Extra named templates registered next to the built-ins.
    pub templates: Vec<TemplateDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            apply_heuristics: defaults::APPLY_HEURISTICS,
            preview_chars: defaults::PREVIEW_CHARS,
            templates: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// - `Config` when a variable holds an invalid value or the templates
    ///   file cannot be read or parsed.
    pub fn from_env() -> NoteResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> NoteResult<Self> {
        let mut config = Self::default();
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(raw) = read(env_vars::HEURISTICS) {
            config.apply_heuristics = parse_flag(&raw).ok_or_else(|| {
                NoteError::Config(format!(
                    "{} must be true or false, got `{raw}`",
                    env_vars::HEURISTICS
                ))
            })?;
        }
        if let Some(raw) = read(env_vars::PREVIEW_CHARS) {
            config.preview_chars = raw.parse::<usize>().map_err(|_| {
                NoteError::Config(format!(
                    "{} must be a positive integer, got `{raw}`",
                    env_vars::PREVIEW_CHARS
                ))
            })?;
        }
        if let Some(path) = read(env_vars::TEMPLATES_FILE) {
            config.templates = load_template_file(Path::new(&path))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> NoteResult<()> {
        if self.preview_chars == 0 || self.preview_chars > defaults::MAX_PREVIEW_CHARS {
            return Err(NoteError::Config(format!(
                "preview_chars must be within 1..={}, got {}",
                defaults::MAX_PREVIEW_CHARS,
                self.preview_chars
            )));
        }
        Ok(())
    }
}

/// Loads template definitions from a JSON file (array of definitions).
pub fn load_template_file(path: &Path) -> NoteResult<Vec<TemplateDefinition>> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        NoteError::Config(format!(
            "failed to read templates file `{}`: {err}",
            path.display()
        ))
    })?;
    serde_json::from_str::<Vec<TemplateDefinition>>(&raw).map_err(|err| {
        NoteError::Config(format!(
            "invalid templates file `{}`: {err}",
            path.display()
        ))
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{env_vars, load_template_file, EngineConfig};
    use crate::error::NoteError;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).expect("defaults are valid");
        assert_eq!(config, EngineConfig::default());
        assert!(config.apply_heuristics);
        assert_eq!(config.preview_chars, 80);
    }

    #[test]
    fn reads_overrides_and_rejects_bad_values() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (env_vars::HEURISTICS, " off "),
            (env_vars::PREVIEW_CHARS, "120"),
        ]))
        .expect("overrides should load");
        assert!(!config.apply_heuristics);
        assert_eq!(config.preview_chars, 120);

        let err = EngineConfig::from_lookup(lookup_from(&[(env_vars::PREVIEW_CHARS, "0")]))
            .expect_err("zero preview length must be rejected");
        assert_eq!(err.code(), "config");
        let err = EngineConfig::from_lookup(lookup_from(&[(env_vars::HEURISTICS, "maybe")]))
            .expect_err("unknown flag must be rejected");
        assert!(matches!(err, NoteError::Config(message) if message.contains("maybe")));
    }

    #[test]
    fn loads_templates_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        write!(
            file,
            r#"[{{"id": "progress", "aliases": ["progress note"], "sections": [{{"name": "Summary"}}]}}]"#
        )
        .expect("temp file should be writable");
        let path = file.path().to_string_lossy().to_string();

        let config =
            EngineConfig::from_lookup(lookup_from(&[(env_vars::TEMPLATES_FILE, path.as_str())]))
                .expect("templates file should load");
        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.templates[0].id, "progress");
    }

    #[test]
    fn missing_templates_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let err = load_template_file(&dir.path().join("absent.json"))
            .expect_err("missing file must fail");
        assert_eq!(err.code(), "config");
    }
}

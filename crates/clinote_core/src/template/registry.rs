//! In-process template registry.
//!
//! # Responsibility
//! - Map template names (and their lookup aliases) to resolved schemas.
//! - Fall back to inline definitions for names that are not registered.
//!
//! # Invariants
//! - Populated during engine construction, read-only afterwards.
//! - Lookup names are unique across all registered templates.

use crate::error::{NoteError, NoteResult};
use crate::model::template::{Template, TemplateError};
use crate::template::builtin::builtin_templates;
use crate::template::definition::{parse_inline, TemplateDefinition};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Template registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidTemplateId(String),
    DuplicateName(String),
    InvalidDefinition { id: String, source: TemplateError },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTemplateId(value) => write!(f, "template id is invalid: {value}"),
            Self::DuplicateName(value) => write!(f, "template name already registered: {value}"),
            Self::InvalidDefinition { id, source } => {
                write!(f, "template `{id}` is invalid: {source}")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDefinition { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Read-only template lookup shared by every engine call.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Arc<Template>>,
    lookup: BTreeMap<String, String>,
}

impl TemplateRegistry {
    /// Empty registry; mostly useful for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `soap`, `hp` and `discharge`.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        let builtins = builtin_templates().map_err(|source| RegistryError::InvalidDefinition {
            id: "builtin".to_string(),
            source,
        })?;
        for (template, aliases) in builtins {
            registry.register(template, aliases)?;
        }
        Ok(registry)
    }

    /// Registers one template plus extra lookup names.
    pub fn register<S: AsRef<str>>(
        &mut self,
        template: Template,
        aliases: &[S],
    ) -> Result<(), RegistryError> {
        let id = template.id().to_string();
        if !is_valid_template_id(&id) {
            return Err(RegistryError::InvalidTemplateId(id));
        }

        let mut names = vec![id.clone()];
        for alias in aliases {
            let name = lookup_name(alias.as_ref());
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        if let Some(taken) = names.iter().find(|name| self.lookup.contains_key(*name)) {
            return Err(RegistryError::DuplicateName(taken.clone()));
        }

        for name in names {
            self.lookup.insert(name, id.clone());
        }
        self.templates.insert(id, Arc::new(template));
        Ok(())
    }

    /// Builds and registers a declarative definition.
    pub fn register_definition(
        &mut self,
        definition: &TemplateDefinition,
    ) -> Result<(), RegistryError> {
        let template = definition
            .build()
            .map_err(|source| RegistryError::InvalidDefinition {
                id: definition.id.clone(),
                source,
            })?;
        self.register(template, &definition.aliases)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns sorted template ids.
    pub fn template_ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// Returns one registered template by id or lookup alias.
    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        let id = self.lookup.get(&lookup_name(name))?;
        self.templates.get(id).cloned()
    }

    /// Resolves a registered name or an inline definition.
    ///
    /// # Errors
    /// - `UnknownTemplate` when `name_or_inline` is neither registered nor a
    ///   valid inline definition; `detail` explains broken inline input.
    pub fn resolve(&self, name_or_inline: &str) -> NoteResult<Arc<Template>> {
        if let Some(template) = self.get(name_or_inline) {
            return Ok(template);
        }

        match parse_inline(name_or_inline) {
            Some(Ok(template)) => {
                debug!(
                    "event=template_resolve module=registry status=ok source=inline sections={}",
                    template.sections().len()
                );
                Ok(Arc::new(template))
            }
            Some(Err(err)) => {
                debug!("event=template_resolve module=registry status=error source=inline");
                Err(NoteError::unknown_template(
                    name_or_inline,
                    Some(err.to_string()),
                ))
            }
            None => Err(NoteError::unknown_template(name_or_inline, None)),
        }
    }
}

fn lookup_name(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn is_valid_template_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, TemplateRegistry};
    use crate::error::NoteError;
    use crate::model::template::{SectionSpec, Template};

    fn registry() -> TemplateRegistry {
        TemplateRegistry::with_builtins().expect("builtins should register")
    }

    #[test]
    fn resolves_builtin_names_and_aliases_case_insensitively() {
        let registry = registry();
        assert_eq!(registry.resolve(" SOAP ").unwrap().id(), "soap");
        assert_eq!(registry.resolve("H&P").unwrap().id(), "hp");
        assert_eq!(registry.resolve("Discharge Summary").unwrap().id(), "discharge");
        assert_eq!(registry.template_ids(), vec!["discharge", "hp", "soap"]);
    }

    #[test]
    fn unknown_name_fails_without_detail() {
        let err = registry().resolve("nonexistent-template").unwrap_err();
        assert!(matches!(
            err,
            NoteError::UnknownTemplate { detail: None, .. }
        ));
    }

    #[test]
    fn broken_inline_definition_fails_with_detail() {
        let err = registry().resolve("sections: A, a").unwrap_err();
        assert!(matches!(
            err,
            NoteError::UnknownTemplate {
                detail: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_or_duplicate_names() {
        let mut registry = registry();
        let template = Template::ordered("Progress Note", "P", vec![SectionSpec::required("A")])
            .expect("template should build");
        assert!(matches!(
            registry.register(template, &[] as &[&str]),
            Err(RegistryError::InvalidTemplateId(_))
        ));

        let template = Template::ordered("progress", "P", vec![SectionSpec::required("A")])
            .expect("template should build");
        assert_eq!(
            registry.register(template, &["soap"]),
            Err(RegistryError::DuplicateName("soap".to_string()))
        );
        assert!(registry.get("progress").is_none());
    }
}

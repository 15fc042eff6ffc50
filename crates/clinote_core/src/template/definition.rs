//! Declarative template definitions (configuration files and inline input).
//!
//! Two inline shapes are accepted by [`parse_inline`]:
//! - JSON: `{"id": "progress", "sections": [{"name": "Summary"}, ...]}`
//! - compact: `sections: Summary, Findings?, Plan` (`?` marks optional)

use crate::model::template::{FormatRule, SectionSpec, Template, TemplateError};
use serde::{Deserialize, Serialize};

/// Id assigned to compact inline templates.
pub const INLINE_TEMPLATE_ID: &str = "inline";

const COMPACT_PREFIX: &str = "sections:";

/// Serializable template declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Extra lookup names for registered templates.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub sections: Vec<SectionDefinition>,
}

/// Serializable section declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Either set on every section or on none.
    #[serde(default)]
    pub order_index: Option<u32>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub format_rule: FormatRule,
}

fn default_required() -> bool {
    true
}

impl TemplateDefinition {
    /// Builds the runtime template, enforcing schema invariants.
    pub fn build(&self) -> Result<Template, TemplateError> {
        let explicit = self
            .sections
            .iter()
            .filter(|section| section.order_index.is_some())
            .count();
        if explicit != 0 && explicit != self.sections.len() {
            return Err(TemplateError::Malformed(
                "order_index must be set on every section or on none".to_string(),
            ));
        }

        let specs = self
            .sections
            .iter()
            .map(|section| {
                let mut spec = SectionSpec::new(section.name.trim(), section.required)
                    .with_rule(section.format_rule);
                spec.aliases = section.aliases.clone();
                spec.keywords = section.keywords.clone();
                if let Some(order_index) = section.order_index {
                    spec.order_index = order_index;
                }
                spec
            })
            .collect::<Vec<_>>();

        let title = self.title.clone().unwrap_or_else(|| self.id.clone());
        if explicit == 0 {
            Template::ordered(self.id.as_str(), title, specs)
        } else {
            Template::new(self.id.as_str(), title, specs)
        }
    }
}

/// Parses an inline template definition.
///
/// Returns `None` when `raw` does not look like an inline definition at all,
/// so callers can distinguish "unknown name" from "broken definition".
pub fn parse_inline(raw: &str) -> Option<Result<Template, TemplateError>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return Some(
            serde_json::from_str::<TemplateDefinition>(trimmed)
                .map_err(|err| TemplateError::Malformed(err.to_string()))
                .and_then(|definition| definition.build()),
        );
    }

    let prefix = trimmed.get(..COMPACT_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(COMPACT_PREFIX) {
        return None;
    }
    Some(parse_compact(&trimmed[COMPACT_PREFIX.len()..]))
}

fn parse_compact(body: &str) -> Result<Template, TemplateError> {
    let specs = body
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.strip_suffix('?') {
            Some(name) => SectionSpec::optional(name.trim()),
            None => SectionSpec::required(entry),
        })
        .collect::<Vec<_>>();
    Template::ordered(INLINE_TEMPLATE_ID, "Inline Template", specs)
}

//! Template schema model.
//!
//! # Responsibility
//! - Define the read-only section schema that drives validation,
//!   normalization and preview.
//! - Precompute heading keys and inference matchers once per template.
//!
//! # Invariants
//! - Section heading keys (names and aliases) are unique within a template.
//! - `order_index` is strictly increasing in declaration order.
//! - A `Template` is never mutated after construction.

use crate::text::heading_key;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Heading casing applied by the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingCase {
    /// Use the section name exactly as declared in the template.
    #[default]
    AsDeclared,
    /// Render the declared name in upper case.
    Upper,
}

/// Canonical formatting rule for one section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatRule {
    pub heading_case: HeadingCase,
    /// Collapse runs of blank lines inside the body into one.
    pub collapse_blank_lines: bool,
    /// Rewrite `*`, `+` and `•` list markers to `-`.
    pub normalize_bullets: bool,
}

/// One expected section of a template.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub name: String,
    pub required: bool,
    pub order_index: u32,
    pub format_rule: FormatRule,
    /// Alternative headings accepted for this section (`S`, `HPI`, ...).
    pub aliases: Vec<String>,
    /// Inference keywords; a trailing `*` marks a prefix match.
    pub keywords: Vec<String>,
    keys: Vec<String>,
    keyword_matcher: Option<Regex>,
}

impl SectionSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            order_index: 0,
            format_rule: FormatRule::default(),
            aliases: Vec::new(),
            keywords: Vec::new(),
            keys: Vec::new(),
            keyword_matcher: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|alias| alias.to_string()));
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords
            .extend(keywords.iter().map(|keyword| keyword.to_string()));
        self
    }

    pub fn with_rule(mut self, format_rule: FormatRule) -> Self {
        self.format_rule = format_rule;
        self
    }

    /// Heading rendered by the normalizer for this section.
    pub fn display_name(&self) -> String {
        match self.format_rule.heading_case {
            HeadingCase::AsDeclared => self.name.clone(),
            HeadingCase::Upper => self.name.to_uppercase(),
        }
    }

    /// Heading keys accepted for this section (name first, then aliases).
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.keys.iter().any(|candidate| candidate == key)
    }

    pub fn has_keywords(&self) -> bool {
        self.keyword_matcher.is_some()
    }

    /// Returns whether one free-text line looks like content of this section.
    pub fn matches_keywords(&self, line: &str) -> bool {
        self.keyword_matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(line))
    }

    fn prepare(&mut self) -> Result<(), TemplateError> {
        let name_key = heading_key(&self.name);
        if name_key.is_empty() {
            return Err(TemplateError::EmptySectionName);
        }
        let mut keys = vec![name_key];
        for alias in &self.aliases {
            let key = heading_key(alias);
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        self.keys = keys;
        self.keyword_matcher = build_keyword_matcher(&self.keywords)?;
        Ok(())
    }
}

/// Resolved section schema.
#[derive(Debug, Clone)]
pub struct Template {
    id: String,
    title: String,
    sections: Vec<SectionSpec>,
}

impl Template {
    /// Builds a template, assigning `order_index` from declaration order.
    pub fn ordered(
        id: impl Into<String>,
        title: impl Into<String>,
        sections: Vec<SectionSpec>,
    ) -> Result<Self, TemplateError> {
        let sections = sections
            .into_iter()
            .enumerate()
            .map(|(idx, mut spec)| {
                spec.order_index = idx as u32;
                spec
            })
            .collect();
        Self::new(id, title, sections)
    }

    /// Builds a template from specs carrying explicit `order_index` values.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        mut sections: Vec<SectionSpec>,
    ) -> Result<Self, TemplateError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(TemplateError::EmptyId);
        }
        if sections.is_empty() {
            return Err(TemplateError::NoSections);
        }

        let mut owners = BTreeMap::<String, String>::new();
        let mut previous_order: Option<u32> = None;
        for spec in &mut sections {
            spec.prepare()?;
            if let Some(previous) = previous_order {
                if spec.order_index <= previous {
                    return Err(TemplateError::OrderNotIncreasing(spec.name.clone()));
                }
            }
            previous_order = Some(spec.order_index);
            for key in spec.keys() {
                if let Some(owner) = owners.insert(key.clone(), spec.name.clone()) {
                    return Err(TemplateError::DuplicateHeading {
                        heading: key.clone(),
                        first: owner,
                        second: spec.name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            sections,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Section specs in `order_index` order.
    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    /// Position of the spec matching one heading key.
    pub fn position_of_key(&self, key: &str) -> Option<usize> {
        self.sections.iter().position(|spec| spec.matches_key(key))
    }

    pub fn spec_for_key(&self, key: &str) -> Option<&SectionSpec> {
        self.position_of_key(key).map(|idx| &self.sections[idx])
    }

    pub fn required_sections(&self) -> impl Iterator<Item = &SectionSpec> {
        self.sections.iter().filter(|spec| spec.required)
    }

    /// Whether any section declares inference keywords.
    pub fn has_inference(&self) -> bool {
        self.sections.iter().any(SectionSpec::has_keywords)
    }
}

fn build_keyword_matcher(keywords: &[String]) -> Result<Option<Regex>, TemplateError> {
    let alternatives = keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .map(|keyword| {
            let (stem, prefix) = match keyword.strip_suffix('*') {
                Some(stem) => (stem, true),
                None => (keyword, false),
            };
            let pattern = stem
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            if prefix {
                format!(r"{pattern}\w*")
            } else {
                pattern
            }
        })
        .collect::<Vec<_>>();
    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|err| TemplateError::InvalidKeyword(err.to_string()))
}

/// Template construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    EmptyId,
    NoSections,
    EmptySectionName,
    DuplicateHeading {
        heading: String,
        first: String,
        second: String,
    },
    OrderNotIncreasing(String),
    InvalidKeyword(String),
    Malformed(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "template id must not be empty"),
            Self::NoSections => write!(f, "template must declare at least one section"),
            Self::EmptySectionName => write!(f, "template contains an empty section name"),
            Self::DuplicateHeading {
                heading,
                first,
                second,
            } => write!(
                f,
                "heading `{heading}` is claimed by both `{first}` and `{second}`"
            ),
            Self::OrderNotIncreasing(name) => {
                write!(f, "order_index of `{name}` is not strictly increasing")
            }
            Self::InvalidKeyword(message) => write!(f, "invalid inference keyword: {message}"),
            Self::Malformed(message) => write!(f, "malformed template definition: {message}"),
        }
    }
}

impl Error for TemplateError {}

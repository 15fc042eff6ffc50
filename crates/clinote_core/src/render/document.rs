//! Wire shapes of structured converter output.

use serde::{Deserialize, Serialize};

/// Version stamped into JSON output; re-ingest only accepts this version.
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Header row of CSV output.
pub const CSV_HEADER: &str = "section,content";

/// JSON document emitted by the `json` output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub format_version: u32,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSection {
    pub name: String,
    pub content: String,
}

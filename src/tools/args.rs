//! Argument types for the tools.
//!
//! # Security
//!
//! All argument types use `#[serde(deny_unknown_fields)]` so a misspelled or
//! injected parameter is rejected instead of silently ignored.

use crate::models::{FacetFilter, TimeRange};
use serde::Deserialize;

/// Arguments for `save_checkpoint`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveCheckpointArgs {
    /// Annotated text to save.
    pub content: String,
    /// Extra tags.
    pub tags: Option<Vec<String>>,
    /// Run the anchor detector (default true).
    pub extract_anchors: Option<bool>,
    /// Derive a summary (default true).
    pub generate_summary: Option<bool>,
}

/// Arguments for `load_context`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadContextArgs {
    /// Free-text query.
    pub query: Option<String>,
    /// Inclusive time window, RFC 3339 timestamps.
    pub time_range: Option<TimeRange>,
    /// Context values; any of them matches.
    pub contexts: Option<Vec<String>>,
    /// Simple state values; any of them matches.
    pub states: Option<Vec<String>>,
    /// Anchor type names (`decision`, `blocker`, ...).
    pub anchor_types: Option<Vec<String>>,
    /// Classification facet filter.
    pub facets: Option<FacetFilter>,
    /// Word budget.
    pub max_tokens: Option<usize>,
    /// Omit entry bodies.
    pub anchors_only: Option<bool>,
}

/// Arguments for `get_anchors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetAnchorsArgs {
    /// Anchor type name.
    #[serde(rename = "type")]
    pub anchor_type: Option<String>,
    /// Only open questions (`true`) or everything else (`false`).
    pub unresolved: Option<bool>,
    /// Maximum anchors returned.
    pub limit: Option<usize>,
}

/// Arguments for `parse_markers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseMarkersArgs {
    /// Text to parse.
    pub text: String,
}

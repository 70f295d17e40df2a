//! Checkpoint request and result types.

use super::{ClassificationFacets, EntryId, SemanticAnchor};
use serde::{Deserialize, Serialize};

/// Request to save a conversation checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRequest {
    /// The annotated text to save.
    pub content: String,
    /// Caller-supplied tags, kept ahead of the derived ones.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether to run the anchor detector.
    #[serde(default = "default_true")]
    pub extract_anchors: bool,
    /// Whether to derive a summary from the first sentence.
    #[serde(default = "default_true")]
    pub generate_summary: bool,
}

const fn default_true() -> bool {
    true
}

impl CheckpointRequest {
    /// Creates a request with anchor extraction and summaries enabled.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tags: Vec::new(),
            extract_anchors: true,
            generate_summary: true,
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Enables or disables anchor extraction.
    #[must_use]
    pub const fn with_anchors(mut self, extract: bool) -> Self {
        self.extract_anchors = extract;
        self
    }

    /// Enables or disables the derived summary.
    #[must_use]
    pub const fn with_summary(mut self, generate: bool) -> Self {
        self.generate_summary = generate;
        self
    }
}

/// Result of a checkpoint save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointResult {
    /// The id of the stored entry.
    pub entry_id: EntryId,
    /// Anchors stored with the entry.
    pub anchors: Vec<SemanticAnchor>,
    /// Facets stored with the entry.
    pub facets: ClassificationFacets,
    /// Final tag list.
    pub tags: Vec<String>,
    /// Derived summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Approximate tokens in the content.
    pub tokens: usize,
    /// Parse problems found in the content, as messages.
    #[serde(default)]
    pub warnings: Vec<String>,
}

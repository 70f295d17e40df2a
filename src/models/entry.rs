//! Conversation entry types and identifiers.

use super::{ClassificationFacets, ParsedDocument, SemanticAnchor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a stored conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new entry ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, time-ordered entry ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A stored conversation checkpoint.
///
/// Entries are owned by the store; the parser and anchor detector only
/// produce the data embedded in them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// When the entry was saved.
    pub timestamp: DateTime<Utc>,
    /// Raw annotated text.
    pub content: String,
    /// Precomputed parse of `content`.
    pub document: ParsedDocument,
    /// Anchors extracted from `content`.
    #[serde(default)]
    pub anchors: Vec<SemanticAnchor>,
    /// Classification facets scraped from `content`.
    #[serde(default)]
    pub facets: ClassificationFacets,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ConversationEntry {
    /// Builds a stored entry from a new entry, an id and a timestamp.
    #[must_use]
    pub fn from_new(entry: NewEntry, id: EntryId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp,
            content: entry.content,
            document: entry.document,
            anchors: entry.anchors,
            facets: entry.facets,
            tags: entry.tags,
            summary: entry.summary,
        }
    }

    /// Returns true if the entry carries a simple state marker with `value`.
    #[must_use]
    pub fn has_state(&self, value: &str) -> bool {
        self.document.simple_states().any(|s| s == value)
    }

    /// Returns true if the entry carries a context marker with `value`.
    #[must_use]
    pub fn has_context(&self, value: &str) -> bool {
        self.document.context_values().any(|c| c == value)
    }
}

/// An entry that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    /// Raw annotated text.
    pub content: String,
    /// Precomputed parse of `content`.
    pub document: ParsedDocument,
    /// Anchors extracted from `content`.
    pub anchors: Vec<SemanticAnchor>,
    /// Classification facets scraped from `content`.
    pub facets: ClassificationFacets,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Optional short summary.
    pub summary: Option<String>,
}

impl NewEntry {
    /// Creates a new entry with only content and its parse.
    #[must_use]
    pub fn new(content: impl Into<String>, document: ParsedDocument) -> Self {
        Self {
            content: content.into(),
            document,
            ..Self::default()
        }
    }

    /// Sets the anchors.
    #[must_use]
    pub fn with_anchors(mut self, anchors: Vec<SemanticAnchor>) -> Self {
        self.anchors = anchors;
        self
    }

    /// Sets the classification facets.
    #[must_use]
    pub fn with_facets(mut self, facets: ClassificationFacets) -> Self {
        self.facets = facets;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_new_keeps_payload() {
        let new = NewEntry::new("hello", ParsedDocument::default())
            .with_tags(vec!["context:test".to_string()])
            .with_summary("hi");
        let entry = ConversationEntry::from_new(new, EntryId::new("e1"), Utc::now());
        assert_eq!(entry.id.as_str(), "e1");
        assert_eq!(entry.content, "hello");
        assert_eq!(entry.tags, vec!["context:test"]);
        assert_eq!(entry.summary.as_deref(), Some("hi"));
    }
}

//! Anchor listing across stored entries.

use crate::Result;
use crate::models::{AnchorType, EntryId, SemanticAnchor};
use crate::storage::ConversationStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Default number of anchors returned.
pub const DEFAULT_ANCHOR_LIMIT: usize = 50;

/// Which anchors to list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorFilter {
    /// Only anchors of this type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub anchor_type: Option<AnchorType>,
    /// `Some(true)`: only open questions. `Some(false)`: everything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<bool>,
    /// Maximum anchors returned.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

const fn default_limit() -> usize {
    DEFAULT_ANCHOR_LIMIT
}

impl Default for AnchorFilter {
    fn default() -> Self {
        Self {
            anchor_type: None,
            unresolved: None,
            limit: DEFAULT_ANCHOR_LIMIT,
        }
    }
}

impl AnchorFilter {
    /// Restricts to one anchor type.
    #[must_use]
    pub const fn with_type(mut self, anchor_type: AnchorType) -> Self {
        self.anchor_type = Some(anchor_type);
        self
    }

    /// Restricts by resolution.
    #[must_use]
    pub const fn with_unresolved(mut self, unresolved: bool) -> Self {
        self.unresolved = Some(unresolved);
        self
    }

    /// Sets the limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn accepts(&self, anchor: &SemanticAnchor) -> bool {
        self.anchor_type.is_none_or(|t| anchor.anchor_type == t)
            && self.unresolved.is_none_or(|u| anchor.is_unresolved() == u)
    }
}

/// An anchor together with the entry that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Owning entry.
    pub entry_id: EntryId,
    /// When the owning entry was saved.
    pub timestamp: DateTime<Utc>,
    /// The anchor.
    #[serde(flatten)]
    pub anchor: SemanticAnchor,
}

/// Lists anchors across a store.
#[derive(Clone)]
pub struct AnchorQuery {
    store: Arc<dyn ConversationStore>,
}

impl std::fmt::Debug for AnchorQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorQuery").finish_non_exhaustive()
    }
}

impl AnchorQuery {
    /// Creates a query over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Returns matching anchors, most confident first; ties go to the newer
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    #[instrument(skip(self), fields(operation = "list_anchors"))]
    pub fn list(&self, filter: &AnchorFilter) -> Result<Vec<AnchorRecord>> {
        let mut records: Vec<AnchorRecord> = self
            .store
            .load_all()?
            .into_iter()
            .flat_map(|entry| {
                let (entry_id, timestamp) = (entry.id, entry.timestamp);
                entry.anchors.into_iter().map(move |anchor| AnchorRecord {
                    entry_id: entry_id.clone(),
                    timestamp,
                    anchor,
                })
            })
            .filter(|record| filter.accepts(&record.anchor))
            .collect();

        records.sort_by(|a, b| {
            b.anchor
                .confidence
                .total_cmp(&a.anchor.confidence)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        records.truncate(filter.limit);
        tracing::debug!(count = records.len(), "Listed anchors");
        Ok(records)
    }
}

//! Checkpoint capture service.
//!
//! Turns annotated text into a stored [`ConversationEntry`](crate::models::ConversationEntry):
//! parse, detect anchors, scrape facets, derive tags and a summary, then
//! hand the result to the store.

use crate::anchors::AnchorDetector;
use crate::models::{CheckpointRequest, CheckpointResult, NewEntry, ParsedDocument};
use crate::parser::{self, ClaimedRanges};
use crate::retrieval::estimate_tokens;
use crate::storage::ConversationStore;
use crate::{Error, Result, facets};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Maximum length of a derived summary, in characters.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Service for saving conversation checkpoints.
#[derive(Clone)]
pub struct CheckpointService {
    store: Arc<dyn ConversationStore>,
    detector: AnchorDetector,
}

impl std::fmt::Debug for CheckpointService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointService")
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

impl CheckpointService {
    /// Creates a service with the default anchor detector.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            detector: AnchorDetector::default(),
        }
    }

    /// Replaces the anchor detector.
    #[must_use]
    pub fn with_detector(mut self, detector: AnchorDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Saves a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The content is empty
    /// - Storage fails
    #[instrument(skip(self, request), fields(operation = "save_checkpoint", content_len = request.content.len()))]
    pub fn save(&self, request: CheckpointRequest) -> Result<CheckpointResult> {
        let start = Instant::now();
        if request.content.trim().is_empty() {
            return Err(Error::InvalidInput("Content cannot be empty".to_string()));
        }

        let document = parser::parse(&request.content);
        let anchors = if request.extract_anchors {
            self.detector.extract_from_document(&document)
        } else {
            Vec::new()
        };
        let facets = facets::extract(&request.content);
        let tags = derive_tags(request.tags, &document);
        let summary = if request.generate_summary {
            summarize(&document)
        } else {
            None
        };
        let warnings: Vec<String> = document.errors.iter().map(|e| e.message.clone()).collect();
        let tokens = estimate_tokens(&request.content);

        let mut entry = NewEntry::new(request.content, document)
            .with_anchors(anchors.clone())
            .with_facets(facets.clone())
            .with_tags(tags.clone());
        entry.summary.clone_from(&summary);

        let entry_id = self.store.save(entry)?;

        metrics::counter!("waymark_checkpoints_total").increment(1);
        metrics::counter!("waymark_anchors_extracted_total").increment(anchors.len() as u64);
        metrics::histogram!("waymark_checkpoint_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::info!(
            entry_id = %entry_id,
            anchors = anchors.len(),
            warnings = warnings.len(),
            "Saved checkpoint"
        );

        Ok(CheckpointResult {
            entry_id,
            anchors,
            facets,
            tags,
            summary,
            tokens,
            warnings,
        })
    }
}

/// Caller tags first, then `context:<value>` and `state:<value>` tags, with
/// duplicates dropped.
fn derive_tags(mut tags: Vec<String>, document: &ParsedDocument) -> Vec<String> {
    let derived = document
        .context_values()
        .map(|c| format!("context:{c}"))
        .chain(document.simple_states().map(|s| format!("state:{s}")));
    for tag in derived {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Returns the first sentence of the document with markers removed, cut to
/// [`MAX_SUMMARY_CHARS`].
#[must_use]
pub fn summarize(document: &ParsedDocument) -> Option<String> {
    let text = document.text.as_str();
    let markers: ClaimedRanges = document
        .states
        .iter()
        .map(|m| m.span)
        .chain(document.contexts.iter().map(|m| m.span))
        .chain(document.patterns.iter().map(|m| m.span))
        .chain(document.branches.iter().map(|m| m.span))
        .chain(document.social_layers.iter().map(|m| m.span))
        .collect();

    let mut plain = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in markers.iter() {
        if span.start > cursor {
            plain.push_str(text.get(cursor..span.start).unwrap_or_default());
        }
        cursor = cursor.max(span.end);
    }
    plain.push_str(text.get(cursor..).unwrap_or_default());

    let sentence = plain
        .split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|s| s.chars().any(char::is_alphanumeric))?;
    let collapsed = sentence.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_SUMMARY_CHARS {
        return Some(collapsed);
    }
    let mut cut: String = collapsed.chars().take(MAX_SUMMARY_CHARS - 3).collect();
    cut.push_str("...");
    Some(cut)
}

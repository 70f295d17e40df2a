//! Semantic anchor detection.
//!
//! Finds decisions, blockers, breakthroughs and questions in annotated text.
//! Two channels feed one batch:
//!
//! 1. **Marker channel**: simple state markers and pattern markers whose label
//!    appears in [`patterns::MARKER_VOCABULARY`].
//! 2. **Pattern channel**: the natural-language library in
//!    [`patterns::ANCHOR_PATTERNS`], boosted near markers.
//!
//! The batch is then linked ([`relations::link`]), merged
//! ([`relations::merge_adjacent`]) and shaped ([`relations::shape`]).
//!
//! # Example
//!
//! ```rust
//! use waymark::anchors::AnchorDetector;
//! use waymark::models::AnchorType;
//!
//! let anchors = AnchorDetector::default().extract("We decided to use PostgreSQL for the database.");
//! assert_eq!(anchors.len(), 1);
//! assert_eq!(anchors[0].anchor_type, AnchorType::Decision);
//! ```

mod config;
mod ids;
pub mod patterns;
pub mod relations;

pub use config::{AnchorConfig, SignalWeights};
pub use ids::{AnchorIdGenerator, SequentialAnchorIds, UuidAnchorIds};

use crate::models::{AnchorType, ExtractionMethod, ParsedDocument, SemanticAnchor, Span};
use crate::parser;
use patterns::{ANCHOR_PATTERNS, RATIONALE, marker_signal};
use std::collections::HashSet;
use std::sync::Arc;

/// Bytes after a marker searched for the anchor text.
const MARKER_LOOKAHEAD: usize = 100;

/// Bytes past a decision match searched for a rationale.
const RATIONALE_LOOKAHEAD: usize = 200;

/// Distance from a marker's end within which pattern matches are boosted.
const MARKER_PROXIMITY: usize = 50;

/// Confidence factor for pattern-marker category hits.
const PATTERN_CATEGORY_FACTOR: f64 = 0.9;

/// Confidence factor for pattern-marker flow hits.
const PATTERN_FLOW_FACTOR: f64 = 0.85;

/// Extracts semantic anchors from text.
///
/// Stateless apart from the injected id generator; safe to share across
/// threads.
#[derive(Debug, Clone)]
pub struct AnchorDetector {
    config: AnchorConfig,
    ids: Arc<dyn AnchorIdGenerator>,
}

impl Default for AnchorDetector {
    fn default() -> Self {
        Self::new(AnchorConfig::default())
    }
}

impl AnchorDetector {
    /// Creates a detector with UUID anchor ids.
    #[must_use]
    pub fn new(config: AnchorConfig) -> Self {
        Self {
            config,
            ids: Arc::new(UuidAnchorIds),
        }
    }

    /// Replaces the id generator.
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn AnchorIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Parses `text` and extracts its anchors.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<SemanticAnchor> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.extract_from_document(&parser::parse(text))
    }

    /// Extracts anchors from an already parsed document.
    #[must_use]
    pub fn extract_from_document(&self, document: &ParsedDocument) -> Vec<SemanticAnchor> {
        let text = document.text.as_str();
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut anchors = self.from_markers(document);
        anchors.extend(self.from_patterns(document));

        if self.config.include_relationships {
            relations::link(&mut anchors, text);
        }
        if self.config.merge_adjacent {
            anchors = relations::merge_adjacent(anchors, text);
        }

        let anchors = relations::shape(
            anchors,
            self.config.min_confidence,
            self.config.max_anchors_per_type,
        );
        metrics::counter!("waymark_anchors_detected_total").increment(anchors.len() as u64);
        tracing::debug!(count = anchors.len(), "Extracted anchors");
        anchors
    }

    fn from_markers(&self, document: &ParsedDocument) -> Vec<SemanticAnchor> {
        let text = document.text.as_str();
        let mut anchors = Vec::new();

        for state in &document.states {
            let Some(label) = state.simple_value() else {
                continue;
            };
            if let Some((anchor_type, confidence)) = marker_signal(label) {
                anchors.push(self.marker_anchor(text, state.span, label, anchor_type, confidence));
            }
        }

        for pattern in &document.patterns {
            if let Some((anchor_type, confidence)) = marker_signal(&pattern.category) {
                anchors.push(self.marker_anchor(
                    text,
                    pattern.span,
                    &pattern.category,
                    anchor_type,
                    confidence * PATTERN_CATEGORY_FACTOR,
                ));
            } else if let Some(flow) = &pattern.flow {
                if let Some((anchor_type, confidence)) = marker_signal(flow) {
                    anchors.push(self.marker_anchor(
                        text,
                        pattern.span,
                        flow,
                        anchor_type,
                        confidence * PATTERN_FLOW_FACTOR,
                    ));
                }
            }
        }

        anchors
    }

    fn marker_anchor(
        &self,
        text: &str,
        marker: Span,
        label: &str,
        anchor_type: AnchorType,
        confidence: f64,
    ) -> SemanticAnchor {
        let window_end = sentence_end(text, marker.end, MARKER_LOOKAHEAD);
        SemanticAnchor {
            id: self.ids.next_id(),
            anchor_type,
            text: text[marker.end..window_end].trim().to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            span: Span::new(marker.start, window_end),
            rationale: None,
            requires_answer: None,
            answers_question: None,
            related_to: Vec::new(),
            marker_context: Some(label.to_string()),
            extraction_method: ExtractionMethod::Marker,
        }
    }

    fn from_patterns(&self, document: &ParsedDocument) -> Vec<SemanticAnchor> {
        let text = document.text.as_str();
        let marker_ends: Vec<usize> = document
            .states
            .iter()
            .map(|s| s.span.end)
            .chain(document.contexts.iter().map(|c| c.span.end))
            .chain(document.patterns.iter().map(|p| p.span.end))
            .collect();
        let boost = self.config.weights.marker_boost();

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut anchors = Vec::new();

        for library in ANCHOR_PATTERNS.iter() {
            for expression in &library.expressions {
                for caps in expression.captures_iter(text) {
                    let Some(whole) = caps.get(0) else {
                        continue;
                    };
                    if !seen.insert((whole.start(), whole.end())) {
                        continue;
                    }
                    let body = caps.get(1).unwrap_or(whole);

                    let near_marker = marker_ends
                        .iter()
                        .any(|end| end.abs_diff(whole.start()) < MARKER_PROXIMITY);
                    let confidence = if near_marker {
                        library.base_confidence * boost
                    } else {
                        library.base_confidence
                    };

                    let rationale = if library.extract_rationale {
                        rationale(text, whole.start(), whole.end())
                    } else {
                        None
                    };

                    anchors.push(SemanticAnchor {
                        id: self.ids.next_id(),
                        anchor_type: library.anchor_type,
                        text: body.as_str().trim().to_string(),
                        confidence: confidence.clamp(0.0, 1.0),
                        span: Span::new(whole.start(), body.end()),
                        rationale,
                        requires_answer: (library.anchor_type == AnchorType::Question)
                            .then_some(true),
                        answers_question: None,
                        related_to: Vec::new(),
                        marker_context: None,
                        extraction_method: ExtractionMethod::Pattern,
                    });
                }
            }
        }

        anchors
    }
}

/// End of the text following `from`: the first `.`, `!` or `?` (inclusive)
/// within `max` bytes, else the window end.
fn sentence_end(text: &str, from: usize, max: usize) -> usize {
    let limit = floor_char_boundary(text, from.saturating_add(max).min(text.len()));
    text[from..limit]
        .find(['.', '!', '?'])
        .map_or(limit, |i| from + i + 1)
}

/// First causal clause between `start` and a short window past `end`.
fn rationale(text: &str, start: usize, end: usize) -> Option<String> {
    let limit = floor_char_boundary(text, end.saturating_add(RATIONALE_LOOKAHEAD).min(text.len()));
    let window = text.get(start..limit)?;
    RATIONALE
        .captures(window)
        .map(|caps| caps[2].trim().to_string())
        .filter(|r| !r.is_empty())
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

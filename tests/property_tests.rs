//! Property-based tests for parsing, anchor detection and retrieval.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Marker statistics agree with the marker lists
//! - Weighted distributions are checked against 1.0
//! - Enhanced directional glyphs are never re-matched as basic ones
//! - Anchor confidence stays within `[0, 1]`
//! - The search cascade stops at the first productive strategy
//! - Shaped results never exceed the token budget

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{Duration, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use waymark::models::{
    ConversationEntry, EntryId, NewEntry, ParseErrorKind, RetrievalRequest, SearchOutcome,
    SearchStrategy,
};
use waymark::storage::InMemoryStore;
use waymark::{AnchorDetector, RetrievalEngine, facets, parse};

const FRAGMENTS: &[&str] = &[
    "{state:analytical}",
    "{state:focused}",
    "{state:intensity|calm[0.4]|alert[0.8]|}",
    "{state:weighted|focused[0.7]|tired[0.3]|}",
    "{state:random!curious[0.5]!bored[0.5]!}",
    "[context:api]",
    "[context:storage]",
    "&pattern:retry|backoff|",
    "&status:blocked|",
    "→",
    "⇉",
    "←←",
    "↔",
    "{branch:alpha|explore}",
    "→merge{branch:alpha}",
    "{social:formal}[mask:polite]",
    "{state:}",
    "[context: ]",
    "We decided to ship it.",
    "Should we cache this?",
    "We are stuck on the migration.",
    "Finally it works!",
    "plain words here",
];

const QUERY_WORDS: &[&str] = &[
    "typescript",
    "safety",
    "analyzing",
    "decided",
    "blocked",
    "api",
    "storage",
    "documented",
    "kubernetes",
    "focused",
    "ship",
];

fn document_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..16).prop_map(|parts| parts.join(" "))
}

fn weight(hundredths: u32) -> String {
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

fn engine_over(texts: &[String]) -> RetrievalEngine {
    let now = Utc::now();
    let entries = texts.iter().enumerate().map(|(i, text)| {
        ConversationEntry::from_new(
            NewEntry::new(text.as_str(), parse(text))
                .with_anchors(AnchorDetector::default().extract(text))
                .with_facets(facets::extract(text)),
            EntryId::new(format!("entry-{i:03}")),
            now - Duration::seconds(i64::try_from(i).unwrap()),
        )
    });
    RetrievalEngine::new(Arc::new(InMemoryStore::with_entries(entries)))
}

proptest! {
    /// Property: `total_markers` equals the sum of the six marker list lengths.
    #[test]
    fn prop_total_markers_matches_lists(text in document_text()) {
        let doc = parse(&text);
        let sum = doc.states.len()
            + doc.contexts.len()
            + doc.patterns.len()
            + doc.directionals.len()
            + doc.branches.len()
            + doc.social_layers.len();
        prop_assert_eq!(doc.statistics.total_markers, sum);
    }

    /// Property: a weighted marker is kept, and flagged exactly once when its
    /// weights do not sum to 1.0.
    #[test]
    fn prop_weighted_sum_is_checked(a in 0u32..=100, b in 0u32..=100) {
        let text = format!("{{state:weighted|alpha[{}]|beta[{}]|}}", weight(a), weight(b));
        let doc = parse(&text);
        prop_assert_eq!(doc.states.len(), 1);

        let validation: Vec<_> = doc.errors_of(ParseErrorKind::Validation).collect();
        if a + b == 100 {
            prop_assert!(validation.is_empty());
        } else {
            prop_assert_eq!(validation.len(), 1);
            prop_assert!(validation[0].message.contains("sum to 1.0"));
        }
    }

    /// Property: no basic operator starts inside an enhanced operator's range.
    #[test]
    fn prop_enhanced_ranges_not_rematched(text in "[→←↔⇉⇇⇋⇄↠ a]{0,40}") {
        let doc = parse(&text);
        let enhanced: Vec<_> = doc.directionals.iter().filter(|d| d.enhanced).collect();
        for basic in doc.directionals.iter().filter(|d| !d.enhanced) {
            prop_assert!(
                !enhanced.iter().any(|e| e.span.start <= basic.span.start && basic.span.start < e.span.end),
                "basic operator at {} sits inside an enhanced range",
                basic.span.start
            );
        }
    }

    /// Property: every anchor's confidence lies in `[0, 1]`.
    #[test]
    fn prop_confidence_is_bounded(text in document_text()) {
        for anchor in AnchorDetector::default().extract(&text) {
            prop_assert!((0.0..=1.0).contains(&anchor.confidence), "confidence {}", anchor.confidence);
        }
    }

    /// Property: strategies used form a prefix of the cascade and end at the
    /// strategy that matched.
    #[test]
    fn prop_cascade_is_a_prefix(
        texts in prop::collection::vec(document_text(), 0..6),
        words in prop::collection::vec(prop::sample::select(QUERY_WORDS), 1..3),
    ) {
        let engine = engine_over(&texts);
        let result = engine.search(&RetrievalRequest::new(words.join(" "))).unwrap();
        let used = &result.metrics.strategies_used;

        prop_assert!(used.len() <= SearchStrategy::CASCADE.len());
        prop_assert_eq!(used.as_slice(), &SearchStrategy::CASCADE[..used.len()]);
        if let SearchOutcome::Matched { strategy, .. } = result.outcome {
            prop_assert_eq!(used.last().copied(), Some(strategy));
        }
    }

    /// Property: the tokens charged never exceed the budget and add up to the
    /// reported total.
    #[test]
    fn prop_budget_is_respected(
        lengths in prop::collection::vec(1usize..40, 0..8),
        max_tokens in 1usize..60,
    ) {
        let texts: Vec<String> = lengths.iter().map(|n| vec!["word"; *n].join(" ")).collect();
        let engine = engine_over(&texts);
        let result = engine
            .search(&RetrievalRequest::default().with_max_tokens(max_tokens))
            .unwrap();

        let charged: usize = result.entries.iter().map(|e| e.tokens).sum();
        prop_assert_eq!(charged, result.total_tokens);
        prop_assert!(result.total_tokens <= max_tokens);
        prop_assert!(result.entries.iter().rev().skip(1).all(|e| !e.truncated));
    }
}

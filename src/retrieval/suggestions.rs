//! Miss explanations, follow-on tool calls and related search terms.

use crate::facets;
use crate::models::{
    AnchorType, AvailableFilters, ConversationEntry, RetrievalRequest, ToolSuggestion,
};
use serde_json::json;
use std::collections::BTreeSet;

/// Maximum suggestions returned on a miss.
pub const MAX_SUGGESTIONS: usize = 2;

/// Maximum related search terms.
pub const MAX_RELATED: usize = 5;

/// Result entries mined for related terms.
const RELATED_SOURCE_ENTRIES: usize = 3;

/// Anchor-text words mined per anchor.
const RELATED_WORDS_PER_ANCHOR: usize = 2;

/// Quoted examples are cut to this many characters.
const MAX_EXAMPLE_CHARS: usize = 40;

const STOP_WORDS: [&str; 4] = ["that", "this", "with", "from"];

/// Collects the filter vocabulary of `entries`.
#[must_use]
pub fn available_filters(entries: &[ConversationEntry]) -> AvailableFilters {
    let mut contexts = BTreeSet::new();
    let mut states = BTreeSet::new();
    let mut anchor_types = BTreeSet::new();

    for entry in entries {
        contexts.extend(entry.document.context_values().map(str::to_string));
        states.extend(entry.document.simple_states().map(str::to_string));
        anchor_types.extend(entry.anchors.iter().map(|a| a.anchor_type));
    }

    AvailableFilters {
        contexts: contexts.into_iter().collect(),
        states: states.into_iter().collect(),
        anchor_types: anchor_types.into_iter().collect(),
        facets: facets::vocabulary(entries),
    }
}

fn example(value: &str) -> String {
    value.chars().take(MAX_EXAMPLE_CHARS).collect()
}

/// Produces at most [`MAX_SUGGESTIONS`] hints for an empty result.
///
/// Filter dimensions the caller has not used come first, in the order
/// context, state, anchor type, content type; the content type hint is only
/// offered when no facet filter is set. When none is left, the caller
/// is told to broaden the query.
#[must_use]
pub fn on_miss(request: &RetrievalRequest, available: &AvailableFilters) -> Vec<String> {
    let filters = &request.filters;
    let mut suggestions = Vec::new();

    if filters.contexts.is_empty() {
        if let Some(context) = available.contexts.first() {
            suggestions.push(format!("Try filtering by context: \"{}\"", example(context)));
        }
    }
    if filters.states.is_empty() {
        if let Some(state) = available.states.first() {
            suggestions.push(format!("Filter by cognitive state: \"{}\"", example(state)));
        }
    }
    if filters.anchor_types.is_empty() {
        if let Some(anchor_type) = available.anchor_types.first() {
            suggestions.push(format!("Search anchors of type \"{anchor_type}\""));
        }
    }
    if filters.facets.is_empty() {
        if let Some(kind) = available.facets.types.first() {
            suggestions.push(format!("Use a content type filter: \"{}\"", example(kind)));
        }
    }

    if suggestions.is_empty() {
        let hint = request
            .effective_query()
            .and_then(|q| q.split_whitespace().next())
            .map_or_else(
                || "Try broader or different search terms".to_string(),
                |word| format!("Try broader or different search terms, e.g. \"{}\"", example(word)),
            );
        suggestions.push(hint);
        if !filters.is_empty() {
            suggestions.push("Remove some filters to widen the candidate pool".to_string());
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Proposes follow-on tool calls for a result.
#[must_use]
pub fn tool_suggestions(query: Option<&str>, entries: &[&ConversationEntry]) -> Vec<ToolSuggestion> {
    let mut tools = Vec::new();

    let mut counts = [0usize; AnchorType::ALL.len()];
    for anchor in entries.iter().flat_map(|e| &e.anchors) {
        if let Some(i) = AnchorType::ALL.iter().position(|t| *t == anchor.anchor_type) {
            counts[i] += 1;
        }
    }
    let dominant = counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .fold(None::<(usize, usize)>, |best, (i, n)| match best {
            Some((_, m)) if m >= *n => best,
            _ => Some((i, *n)),
        });
    if let Some((i, n)) = dominant {
        let anchor_type = AnchorType::ALL[i];
        tools.push(ToolSuggestion {
            tool: "get_anchors".to_string(),
            args: json!({ "type": anchor_type.as_str(), "limit": 10 }),
            reason: format!("Found {n} {anchor_type} anchors in results"),
        });
    }

    let lowered = query.map(str::to_lowercase).unwrap_or_default();
    if lowered.contains("decided") || lowered.contains("found") {
        tools.push(ToolSuggestion {
            tool: "save_checkpoint".to_string(),
            args: json!({ "extract_anchors": true, "generate_summary": true }),
            reason: "Query suggests new decision or discovery to save".to_string(),
        });
    }

    tools
}

/// Mines up to [`MAX_RELATED`] related terms from the leading results.
#[must_use]
pub fn related_searches(query: Option<&str>, entries: &[&ConversationEntry]) -> Vec<String> {
    let query_tokens: Vec<String> = query
        .map(|q| q.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default();

    let mut terms: Vec<String> = Vec::new();
    let mut push = |term: String| {
        if !term.is_empty() && !query_tokens.contains(&term) && !terms.contains(&term) {
            terms.push(term);
        }
    };

    for entry in entries.iter().take(RELATED_SOURCE_ENTRIES) {
        for anchor in &entry.anchors {
            anchor
                .text
                .split_whitespace()
                .map(|w| {
                    w.trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase()
                })
                .filter(|w| w.chars().count() > 4 && !STOP_WORDS.contains(&w.as_str()))
                .take(RELATED_WORDS_PER_ANCHOR)
                .for_each(&mut push);
        }
        for context in entry.document.context_values() {
            push(context.to_lowercase());
        }
        for kind in &entry.facets.types {
            push(kind.to_lowercase());
        }
    }

    terms.truncate(MAX_RELATED);
    terms
}

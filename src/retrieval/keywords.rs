//! Keyword dictionaries used by the fallback strategies.
//!
//! All lookups compare whole, lower-cased query tokens against the
//! dictionary words.

use crate::models::{AnchorType, FacetDimension};

/// Query words that imply an anchor type, checked in order.
pub const ANCHOR_KEYWORDS: [(AnchorType, &[&str]); 4] = [
    (
        AnchorType::Decision,
        &["decision", "decided", "choose", "chose", "choice"],
    ),
    (
        AnchorType::Breakthrough,
        &["breakthrough", "discovered", "solved", "eureka", "found"],
    ),
    (
        AnchorType::Blocker,
        &["blocked", "stuck", "problem", "issue", "blocker"],
    ),
    (
        AnchorType::Question,
        &["question", "wondering", "should", "how", "why", "what"],
    ),
];

/// Query words that imply a canonical cognitive state, checked in order.
pub const STATE_KEYWORDS: [(&str, &[&str]); 7] = [
    ("analytical", &["analytical", "analyzing", "analysis", "thinking"]),
    (
        "curious",
        &["curious", "wondering", "exploring", "investigating"],
    ),
    ("focused", &["focused", "concentrating", "attention"]),
    ("planning", &["planning", "designing", "architecting"]),
    ("decisive", &["decisive", "decided", "determined"]),
    ("blocked", &["blocked", "stuck", "frustrated"]),
    ("creative", &["creative", "innovative", "imaginative"]),
];

/// Query words that imply a classification facet value.
pub const FACET_KEYWORDS: [(&str, FacetDimension, &str); 23] = [
    ("observed", FacetDimension::Type, "observation"),
    ("noticed", FacetDimension::Type, "observation"),
    ("documented", FacetDimension::Type, "observation"),
    ("analyzed", FacetDimension::Type, "analysis"),
    ("examined", FacetDimension::Type, "analysis"),
    ("evaluated", FacetDimension::Type, "analysis"),
    ("theoretical", FacetDimension::Type, "theory"),
    ("hypothesis", FacetDimension::Type, "theory"),
    ("framework", FacetDimension::Type, "theory"),
    ("steps", FacetDimension::Type, "procedure"),
    ("process", FacetDimension::Type, "procedure"),
    ("workflow", FacetDimension::Type, "procedure"),
    ("example", FacetDimension::Type, "case_study"),
    ("emerging", FacetDimension::Insight, "emergent"),
    ("discovered", FacetDimension::Insight, "emergent"),
    ("recursive", FacetDimension::Insight, "meta"),
    ("self-referential", FacetDimension::Insight, "meta"),
    ("team", FacetDimension::Insight, "collective"),
    ("shared", FacetDimension::Insight, "collective"),
    ("applied", FacetDimension::Insight, "practical"),
    ("prototype", FacetDimension::Level, "experimental"),
    ("exploration", FacetDimension::Level, "experimental"),
    ("firsthand", FacetDimension::Source, "direct"),
];

/// Splits a query into lower-cased whitespace tokens.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Returns the first anchor type whose keywords contain any token.
#[must_use]
pub fn anchor_type_for(tokens: &[String]) -> Option<AnchorType> {
    ANCHOR_KEYWORDS
        .iter()
        .find(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
        .map(|(anchor_type, _)| *anchor_type)
}

/// Returns the first canonical state whose keywords contain any token.
#[must_use]
pub fn state_for(tokens: &[String]) -> Option<&'static str> {
    STATE_KEYWORDS
        .iter()
        .find(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
        .map(|(state, _)| *state)
}

/// Returns every facet implied by `token`.
pub fn facets_for(token: &str) -> impl Iterator<Item = (FacetDimension, &'static str)> + '_ {
    FACET_KEYWORDS
        .iter()
        .filter(move |(word, _, _)| *word == token)
        .map(|(_, dimension, value)| (*dimension, *value))
}

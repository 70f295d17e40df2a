//! Classification facet extraction.
//!
//! Facets are fixed-pattern metadata that live alongside the cognitive
//! markers:
//!
//! | Dimension | Syntax |
//! |-----------|--------|
//! | type | `[type:observation]` |
//! | insight | `[insight:emergent]` |
//! | level | `[level:basic]` |
//! | pattern | `&pattern:stable@`, `&pattern:emerging@active@` |
//! | source | `{source:direct}` |
//! | anchor | `[anchor:type:breakthrough]` |
//! | resonance | `&resonance:partial@0.7@` |
//! | temporal | `[temporal:past]` |
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::{ClassificationFacets, ConversationEntry, FacetDimension};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// How a dimension's raw capture becomes a facet value.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Single label.
    Label,
    /// `name` or `name@qualifier`; the match must be followed by whitespace,
    /// end of text, `&`, `[` or `{`.
    Qualified,
}

struct FacetPattern {
    dimension: FacetDimension,
    regex: Regex,
    shape: Shape,
}

static FACET_PATTERNS: LazyLock<Vec<FacetPattern>> = LazyLock::new(|| {
    let label = |dimension, pattern: &str| FacetPattern {
        dimension,
        regex: Regex::new(pattern).expect("static regex: facet label"),
        shape: Shape::Label,
    };
    let qualified = |dimension, pattern: &str| FacetPattern {
        dimension,
        regex: Regex::new(pattern).expect("static regex: facet qualified"),
        shape: Shape::Qualified,
    };

    vec![
        label(FacetDimension::Type, r"\[type:([^\]]+)\]"),
        label(FacetDimension::Insight, r"\[insight:([^\]]+)\]"),
        label(FacetDimension::Level, r"\[level:([^\]]+)\]"),
        qualified(
            FacetDimension::Pattern,
            r"&pattern:([^@\s&\[\{]+)(?:@([^@\s&\[\{]*)@?)?",
        ),
        label(FacetDimension::Source, r"\{source:([^}]+)\}"),
        label(FacetDimension::AnchorRef, r"\[anchor:([^\]]+)\]"),
        qualified(
            FacetDimension::Resonance,
            r"&resonance:([^@\s&\[\{]+)(?:@([^@\s&\[\{]*)@?)?",
        ),
        label(FacetDimension::Temporal, r"\[temporal:([^\]]+)\]"),
    ]
});

fn at_boundary(text: &str, offset: usize) -> bool {
    text[offset..]
        .chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || matches!(c, '&' | '[' | '{'))
}

fn values_for<'a>(pattern: &'a FacetPattern, text: &'a str) -> impl Iterator<Item = String> + 'a {
    pattern.regex.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str().trim();
        match pattern.shape {
            Shape::Label => Some(name.to_string()),
            Shape::Qualified => {
                if !at_boundary(text, whole.end()) {
                    return None;
                }
                let qualifier = caps.get(2).map_or("", |q| q.as_str().trim());
                if qualifier.is_empty() {
                    Some(name.to_string())
                } else {
                    Some(format!("{name}@{qualifier}"))
                }
            },
        }
    })
}

/// Extracts classification facets, de-duplicated in first-seen order.
#[must_use]
pub fn extract(text: &str) -> ClassificationFacets {
    let mut facets = ClassificationFacets::default();
    for pattern in FACET_PATTERNS.iter() {
        let values = facets.values_mut(pattern.dimension);
        for value in values_for(pattern, text) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    facets
}

/// Returns true if `text` carries at least one facet marker.
#[must_use]
pub fn has_facet_markers(text: &str) -> bool {
    FACET_PATTERNS
        .iter()
        .any(|pattern| values_for(pattern, text).next().is_some())
}

/// Collects every facet value across `entries`, sorted per dimension.
#[must_use]
pub fn vocabulary<'a>(entries: impl IntoIterator<Item = &'a ConversationEntry>) -> ClassificationFacets {
    let mut sets: Vec<(FacetDimension, BTreeSet<String>)> = FacetDimension::ALL
        .into_iter()
        .map(|d| (d, BTreeSet::new()))
        .collect();

    for entry in entries {
        for (dimension, value) in entry.facets.iter() {
            if let Some((_, set)) = sets.iter_mut().find(|(d, _)| *d == dimension) {
                set.insert(value.to_string());
            }
        }
    }

    let mut facets = ClassificationFacets::default();
    for (dimension, set) in sets {
        *facets.values_mut(dimension) = set.into_iter().collect();
    }
    facets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_every_dimension() {
        let text = "[type:observation] [insight:emergent] [level:basic] &pattern:emerging@active@ \
                    {source:direct} [anchor:type:breakthrough] &resonance:partial@0.7@ [temporal:past]";
        let facets = extract(text);
        assert_eq!(facets.types, vec!["observation"]);
        assert_eq!(facets.insights, vec!["emergent"]);
        assert_eq!(facets.levels, vec!["basic"]);
        assert_eq!(facets.patterns, vec!["emerging@active"]);
        assert_eq!(facets.sources, vec!["direct"]);
        assert_eq!(facets.anchor_refs, vec!["type:breakthrough"]);
        assert_eq!(facets.resonance, vec!["partial@0.7"]);
        assert_eq!(facets.temporal, vec!["past"]);
    }

    #[test]
    fn test_values_are_trimmed_and_deduplicated() {
        let facets = extract("[type: analysis ] [type:analysis] [type:theory]");
        assert_eq!(facets.types, vec!["analysis", "theory"]);
    }

    #[test]
    fn test_pattern_without_status() {
        let facets = extract("&pattern:stable@ and &pattern:drifting");
        assert_eq!(facets.patterns, vec!["stable", "drifting"]);
    }

    #[test]
    fn test_pattern_must_end_at_boundary() {
        assert!(extract("&pattern:a@b@x").patterns.is_empty());
        assert_eq!(extract("&pattern:a@b@[type:x]").patterns, vec!["a@b"]);
    }

    #[test]
    fn test_has_facet_markers() {
        assert!(has_facet_markers("see [level:advanced]"));
        assert!(!has_facet_markers("plain text {state:focused}"));
    }
}

//! The five cascade strategies.

use super::keywords;
use crate::models::{ConversationEntry, SearchStrategy};

/// A normalized free-text query.
#[derive(Debug, Clone)]
pub struct Query {
    /// Lower-cased query.
    pub lowered: String,
    /// Lower-cased whitespace tokens.
    pub tokens: Vec<String>,
}

impl Query {
    /// Normalizes `raw`.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            lowered: raw.trim().to_lowercase(),
            tokens: keywords::tokenize(raw),
        }
    }
}

/// Runs one strategy over `pool`, keeping pool order.
#[must_use]
pub fn run<'a>(
    strategy: SearchStrategy,
    query: &Query,
    pool: &'a [ConversationEntry],
) -> Vec<&'a ConversationEntry> {
    match strategy {
        SearchStrategy::Content => pool.iter().filter(|e| content(query, e)).collect(),
        SearchStrategy::Facet => pool.iter().filter(|e| facet(query, e)).collect(),
        SearchStrategy::Anchor => {
            let inferred = keywords::anchor_type_for(&query.tokens);
            pool.iter()
                .filter(|e| {
                    anchor_text(query, e)
                        || inferred.is_some_and(|t| e.anchors.iter().any(|a| a.anchor_type == t))
                })
                .collect()
        },
        SearchStrategy::State => {
            let inferred = keywords::state_for(&query.tokens);
            pool.iter()
                .filter(|e| inferred.is_some_and(|s| e.has_state(s)) || direct_state(query, e))
                .collect()
        },
        SearchStrategy::Context => pool.iter().filter(|e| context(query, e)).collect(),
    }
}

/// Every token is a substring of body + summary.
fn content(query: &Query, entry: &ConversationEntry) -> bool {
    if query.tokens.is_empty() {
        return false;
    }
    let mut haystack = entry.content.to_lowercase();
    if let Some(summary) = &entry.summary {
        haystack.push(' ');
        haystack.push_str(&summary.to_lowercase());
    }
    query.tokens.iter().all(|t| haystack.contains(t.as_str()))
}

/// A token equals a facet value (or its name before `@`), or maps to a facet
/// the entry carries.
fn facet(query: &Query, entry: &ConversationEntry) -> bool {
    query.tokens.iter().any(|token| {
        let direct = entry.facets.iter().any(|(_, value)| {
            let value = value.to_lowercase();
            let name = value.split('@').next().unwrap_or_default();
            value == *token || name == token.as_str()
        });
        direct
            || keywords::facets_for(token)
                .any(|(dimension, value)| entry.facets.contains(dimension, value))
    })
}

/// Every token appears in the entry's joined anchor texts.
fn anchor_text(query: &Query, entry: &ConversationEntry) -> bool {
    if entry.anchors.is_empty() || query.tokens.is_empty() {
        return false;
    }
    let joined = entry
        .anchors
        .iter()
        .map(|a| a.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    query.tokens.iter().all(|t| joined.contains(t.as_str()))
}

/// A simple state name appears verbatim in the query.
fn direct_state(query: &Query, entry: &ConversationEntry) -> bool {
    entry.document.simple_states().any(|s| {
        let s = s.to_lowercase();
        !s.is_empty() && query.lowered.contains(&s)
    })
}

/// The query contains a context value or vice versa.
fn context(query: &Query, entry: &ConversationEntry) -> bool {
    if query.lowered.is_empty() {
        return false;
    }
    entry.document.context_values().any(|c| {
        let c = c.to_lowercase();
        !c.is_empty() && (query.lowered.contains(&c) || c.contains(&query.lowered))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::AnchorDetector;
    use crate::models::{ClassificationFacets, EntryId, NewEntry};
    use crate::parser;
    use chrono::Utc;

    fn entry(text: &str) -> ConversationEntry {
        let new = NewEntry::new(text, parser::parse(text)).with_facets(crate::facets::extract(text));
        ConversationEntry::from_new(new, EntryId::generate(), Utc::now())
    }

    fn hits(strategy: SearchStrategy, q: &str, pool: &[ConversationEntry]) -> usize {
        run(strategy, &Query::new(q), pool).len()
    }

    #[test]
    fn test_content_requires_every_token() {
        let pool = vec![
            entry("TypeScript gives type safety"),
            entry("TypeScript compiles to JS"),
        ];
        assert_eq!(hits(SearchStrategy::Content, "typescript safety", &pool), 1);
        assert_eq!(hits(SearchStrategy::Content, "typescript", &pool), 2);
    }

    #[test]
    fn test_content_searches_summary() {
        let mut e = entry("body text");
        e.summary = Some("Quarterly Roadmap".to_string());
        assert_eq!(hits(SearchStrategy::Content, "roadmap", &[e]), 1);
    }

    #[test]
    fn test_facet_direct_and_keyword() {
        let pool = vec![entry("notes [type:observation] &pattern:stable@active@")];
        assert_eq!(hits(SearchStrategy::Facet, "observation", &pool), 1);
        assert_eq!(hits(SearchStrategy::Facet, "stable", &pool), 1);
        assert_eq!(hits(SearchStrategy::Facet, "documented", &pool), 1);
        assert_eq!(hits(SearchStrategy::Facet, "analysis", &pool), 0);
    }

    #[test]
    fn test_facet_ignores_entries_without_facets() {
        let mut e = entry("plain");
        e.facets = ClassificationFacets::default();
        assert_eq!(hits(SearchStrategy::Facet, "observation", &[e]), 0);
    }

    #[test]
    fn test_anchor_text_or_inferred_type() {
        let text = "We decided to use PostgreSQL for the database.";
        let mut e = entry(text);
        e.anchors = AnchorDetector::default().extract(text);
        let pool = vec![e];
        assert_eq!(hits(SearchStrategy::Anchor, "postgresql database", &pool), 1);
        assert_eq!(hits(SearchStrategy::Anchor, "choice", &pool), 1);
        assert_eq!(hits(SearchStrategy::Anchor, "stuck", &pool), 0);
    }

    #[test]
    fn test_state_synonym_and_direct_name() {
        let pool = vec![entry("I am {state:analytical} about this problem")];
        assert_eq!(hits(SearchStrategy::State, "analyzing", &pool), 1);
        assert_eq!(hits(SearchStrategy::State, "very analytical mood", &pool), 1);
        assert_eq!(hits(SearchStrategy::State, "creative", &pool), 0);
    }

    #[test]
    fn test_context_is_bidirectional() {
        let pool = vec![entry("work [context:database_migration]")];
        assert_eq!(hits(SearchStrategy::Context, "database", &pool), 1);
        assert_eq!(
            hits(SearchStrategy::Context, "notes on database_migration work", &pool),
            1
        );
        assert_eq!(hits(SearchStrategy::Context, "frontend", &pool), 0);
    }
}

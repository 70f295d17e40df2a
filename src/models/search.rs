//! Retrieval request, filter and result types.

use super::{AnchorType, ClassificationFacets, ConversationEntry, EntryId, SemanticAnchor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default token budget for a retrieval call.
pub const DEFAULT_MAX_TOKENS: usize = 4000;

/// One step of the fallback cascade, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Every query token is a substring of body + summary.
    Content,
    /// Query tokens hit classification facets.
    Facet,
    /// Query tokens hit anchor text or an anchor-type keyword.
    Anchor,
    /// Query tokens map to a cognitive state the entry carries.
    State,
    /// Query and a context value contain one another.
    Context,
}

impl SearchStrategy {
    /// The fixed cascade order.
    pub const CASCADE: [Self; 5] = [
        Self::Content,
        Self::Facet,
        Self::Anchor,
        Self::State,
        Self::Context,
    ];

    /// Returns the strategy as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Facet => "facet",
            Self::Anchor => "anchor",
            Self::State => "state",
            Self::Context => "context",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest timestamp.
    pub start: DateTime<Utc>,
    /// Latest timestamp.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `ts` lies within the window.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Classification facet filter.
///
/// Any-of within a dimension, AND across dimensions. An entry with no values
/// for a filtered dimension never matches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilter {
    /// Accepted content types.
    #[serde(default)]
    pub types: Vec<String>,
    /// Accepted insight kinds.
    #[serde(default)]
    pub insights: Vec<String>,
    /// Accepted levels.
    #[serde(default)]
    pub levels: Vec<String>,
    /// Accepted patterns.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Accepted sources.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl FacetFilter {
    /// Returns true if no dimension is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.insights.is_empty()
            && self.levels.is_empty()
            && self.patterns.is_empty()
            && self.sources.is_empty()
    }

    /// Returns true if `facets` satisfies every filtered dimension.
    #[must_use]
    pub fn matches(&self, facets: &ClassificationFacets) -> bool {
        fn any_of(values: &[String], accepted: &[String]) -> bool {
            accepted.is_empty() || values.iter().any(|v| accepted.contains(v))
        }

        any_of(&facets.types, &self.types)
            && any_of(&facets.insights, &self.insights)
            && any_of(&facets.levels, &self.levels)
            && any_of(&facets.patterns, &self.patterns)
            && any_of(&facets.sources, &self.sources)
    }
}

/// Structured filter criteria applied before any free-text matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Time window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// Accepted context values.
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Accepted simple state values.
    #[serde(default)]
    pub states: Vec<String>,
    /// Accepted anchor types.
    #[serde(default)]
    pub anchor_types: Vec<AnchorType>,
    /// Classification facet filter.
    #[serde(default)]
    pub facets: FacetFilter,
}

impl SearchCriteria {
    /// Creates empty criteria (matches all).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a time window.
    #[must_use]
    pub const fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Adds a context filter.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    /// Adds a state filter.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Adds an anchor type filter.
    #[must_use]
    pub fn with_anchor_type(mut self, anchor_type: AnchorType) -> Self {
        self.anchor_types.push(anchor_type);
        self
    }

    /// Sets the facet filter.
    #[must_use]
    pub fn with_facets(mut self, facets: FacetFilter) -> Self {
        self.facets = facets;
        self
    }

    /// Returns true if no dimension is filtered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_range.is_none()
            && self.contexts.is_empty()
            && self.states.is_empty()
            && self.anchor_types.is_empty()
            && self.facets.is_empty()
    }

    /// Returns true if `entry` passes every filtered dimension.
    #[must_use]
    pub fn matches(&self, entry: &ConversationEntry) -> bool {
        if let Some(range) = &self.time_range {
            if !range.contains(entry.timestamp) {
                return false;
            }
        }
        if !self.contexts.is_empty() && !self.contexts.iter().any(|c| entry.has_context(c)) {
            return false;
        }
        if !self.states.is_empty() && !self.states.iter().any(|s| entry.has_state(s)) {
            return false;
        }
        if !self.anchor_types.is_empty()
            && !entry
                .anchors
                .iter()
                .any(|a| self.anchor_types.contains(&a.anchor_type))
        {
            return false;
        }
        self.facets.matches(&entry.facets)
    }
}

/// A retrieval call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Optional free-text query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Structured filters.
    #[serde(default)]
    pub filters: SearchCriteria,
    /// Approximate word budget.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Omit entry bodies from the result.
    #[serde(default)]
    pub anchors_only: bool,
}

const fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for RetrievalRequest {
    fn default() -> Self {
        Self {
            query: None,
            filters: SearchCriteria::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            anchors_only: false,
        }
    }
}

impl RetrievalRequest {
    /// Creates a request for a free-text query.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Sets the filters.
    #[must_use]
    pub fn with_filters(mut self, filters: SearchCriteria) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Omits entry bodies.
    #[must_use]
    pub const fn anchors_only(mut self, anchors_only: bool) -> Self {
        self.anchors_only = anchors_only;
        self
    }

    /// Returns the trimmed query, if it is non-blank.
    #[must_use]
    pub fn effective_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// One entry in a shaped result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedEntry {
    /// Entry identifier.
    pub entry_id: EntryId,
    /// When the entry was saved.
    pub timestamp: DateTime<Utc>,
    /// Body, possibly truncated; `None` when only anchors were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Entry summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Entry tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Entry anchors.
    #[serde(default)]
    pub anchors: Vec<SemanticAnchor>,
    /// Tokens charged against the budget.
    pub tokens: usize,
    /// True if the body was cut to fit the budget.
    #[serde(default)]
    pub truncated: bool,
}

/// Distinct filter values present in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFilters {
    /// Context values, sorted.
    pub contexts: Vec<String>,
    /// Simple state values, sorted.
    pub states: Vec<String>,
    /// Anchor types present, sorted.
    pub anchor_types: Vec<AnchorType>,
    /// Classification facet values, sorted per dimension.
    pub facets: ClassificationFacets,
}

/// How a retrieval call resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A cascade strategy produced results.
    Matched {
        /// The strategy that satisfied the query.
        strategy: SearchStrategy,
        /// Set when the satisfying strategy was not the first one tried.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<SearchStrategy>,
    },
    /// No query was given; the filtered pool was returned.
    Unqueried,
    /// Nothing matched.
    NoMatch {
        /// Filter values the caller could try.
        available_filters: AvailableFilters,
        /// At most two prioritised hints.
        suggestions: Vec<String>,
    },
}

/// Timing and cascade bookkeeping for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetrics {
    /// Entries in the whole store when the call started.
    pub candidates_evaluated: usize,
    /// Strategies attempted, in order.
    pub strategies_used: Vec<SearchStrategy>,
    /// Wall-clock time in milliseconds.
    pub time_ms: u64,
}

/// A follow-on tool call the caller may want to make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSuggestion {
    /// Tool name.
    pub tool: String,
    /// Suggested arguments.
    pub args: serde_json::Value,
    /// Why it is suggested.
    pub reason: String,
}

/// The response of a retrieval call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Shaped entries, newest first.
    pub entries: Vec<RetrievedEntry>,
    /// Tokens consumed; never more than the budget.
    pub total_tokens: usize,
    /// The query as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Which branch the call took.
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    /// Cascade bookkeeping.
    pub metrics: SearchMetrics,
    /// Follow-on tool calls.
    #[serde(default)]
    pub tool_suggestions: Vec<ToolSuggestion>,
    /// Related search terms.
    #[serde(default)]
    pub related_searches: Vec<String>,
}

impl RetrievalResult {
    /// Returns the strategy that satisfied the query, if any.
    #[must_use]
    pub const fn search_strategy(&self) -> Option<SearchStrategy> {
        match &self.outcome {
            SearchOutcome::Matched { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }

    /// Returns the miss suggestions, if the call matched nothing.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        match &self.outcome {
            SearchOutcome::NoMatch { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Returns true if no entries were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParsedDocument;
    use chrono::TimeZone;

    fn entry_at(secs: i64) -> ConversationEntry {
        ConversationEntry {
            id: EntryId::new("e"),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            content: String::new(),
            document: ParsedDocument::default(),
            anchors: Vec::new(),
            facets: ClassificationFacets::default(),
            tags: Vec::new(),
            summary: None,
        }
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let range = TimeRange::new(
            Utc.timestamp_opt(100, 0).unwrap(),
            Utc.timestamp_opt(200, 0).unwrap(),
        );
        let criteria = SearchCriteria::new().with_time_range(range);
        assert!(criteria.matches(&entry_at(100)));
        assert!(criteria.matches(&entry_at(200)));
        assert!(!criteria.matches(&entry_at(201)));
    }

    #[test]
    fn test_facet_filter_requires_values() {
        let filter = FacetFilter {
            types: vec!["observation".to_string()],
            ..FacetFilter::default()
        };
        assert!(!filter.matches(&ClassificationFacets::default()));
        let facets = ClassificationFacets {
            types: vec!["analysis".to_string(), "observation".to_string()],
            ..ClassificationFacets::default()
        };
        assert!(filter.matches(&facets));
        assert!(FacetFilter::default().matches(&ClassificationFacets::default()));
    }

    #[test]
    fn test_effective_query_ignores_blank() {
        assert_eq!(RetrievalRequest::new("   ").effective_query(), None);
        assert_eq!(
            RetrievalRequest::new(" rust ").effective_query(),
            Some("rust")
        );
        assert_eq!(RetrievalRequest::default().max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = SearchOutcome::Matched {
            strategy: SearchStrategy::State,
            fallback: Some(SearchStrategy::State),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "matched");
        assert_eq!(json["strategy"], "state");
    }
}

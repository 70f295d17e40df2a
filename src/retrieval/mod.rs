//! Multi-layer retrieval with graceful degradation.
//!
//! A search runs in five steps:
//!
//! 1. **Filter** the store with the request's [`SearchCriteria`](crate::models::SearchCriteria).
//! 2. **Cascade** through [`SearchStrategy::CASCADE`] when a query is given,
//!    stopping at the first strategy that matches anything.
//! 3. **Shape** the matches newest first under the token budget.
//! 4. **Explain** an empty result with the store's filter vocabulary and at
//!    most two suggestions.
//! 5. **Suggest** follow-on tool calls and related search terms.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use waymark::models::{NewEntry, RetrievalRequest, SearchStrategy};
//! use waymark::retrieval::RetrievalEngine;
//! use waymark::storage::{ConversationStore, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let text = "I am {state:analytical} about this problem";
//! store.save(NewEntry::new(text, waymark::parser::parse(text))).unwrap();
//!
//! let engine = RetrievalEngine::new(store);
//! let result = engine.search(&RetrievalRequest::new("analyzing")).unwrap();
//! assert_eq!(result.search_strategy(), Some(SearchStrategy::State));
//! ```

mod keywords;
mod shaping;
mod strategies;
mod suggestions;

pub use keywords::{ANCHOR_KEYWORDS, FACET_KEYWORDS, STATE_KEYWORDS};
pub use shaping::{CONTINUATION, estimate_tokens};
pub use suggestions::{MAX_RELATED, MAX_SUGGESTIONS, available_filters};

use crate::Result;
use crate::models::{
    ConversationEntry, RetrievalRequest, RetrievalResult, SearchMetrics, SearchOutcome,
    SearchStrategy,
};
use crate::storage::ConversationStore;
use std::sync::Arc;
use std::time::Instant;
use strategies::Query;
use tracing::instrument;

/// Searches a conversation store.
#[derive(Clone)]
pub struct RetrievalEngine {
    store: Arc<dyn ConversationStore>,
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine").finish_non_exhaustive()
    }
}

/// The cascade's chosen matches and bookkeeping.
struct Cascade<'a> {
    matches: Vec<&'a ConversationEntry>,
    strategies_used: Vec<SearchStrategy>,
    strategy: Option<SearchStrategy>,
}

fn cascade<'a>(query: &Query, pool: &'a [ConversationEntry]) -> Cascade<'a> {
    let mut strategies_used = Vec::new();
    if pool.is_empty() {
        return Cascade {
            matches: Vec::new(),
            strategies_used,
            strategy: None,
        };
    }

    for strategy in SearchStrategy::CASCADE {
        strategies_used.push(strategy);
        let matches = strategies::run(strategy, query, pool);
        tracing::trace!(strategy = %strategy, matches = matches.len(), "Strategy attempted");
        if !matches.is_empty() {
            return Cascade {
                matches,
                strategies_used,
                strategy: Some(strategy),
            };
        }
    }

    Cascade {
        matches: Vec::new(),
        strategies_used,
        strategy: None,
    }
}

impl RetrievalEngine {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Runs a retrieval request.
    ///
    /// # Errors
    ///
    /// Returns the store's error if either read fails; a storage failure
    /// aborts the whole search.
    #[instrument(
        skip(self, request),
        fields(operation = "search", query = ?request.effective_query(), max_tokens = request.max_tokens)
    )]
    pub fn search(&self, request: &RetrievalRequest) -> Result<RetrievalResult> {
        let start = Instant::now();
        let all = self.store.load_all()?;
        let pool = self.store.search(&request.filters)?;
        let query = request.effective_query();

        let (mut chosen, strategies_used, strategy) = match query {
            Some(q) => {
                let found = cascade(&Query::new(q), &pool);
                (found.matches, found.strategies_used, found.strategy)
            },
            None => (pool.iter().collect(), Vec::new(), None),
        };

        shaping::newest_first(&mut chosen);
        let (entries, total_tokens) =
            shaping::shape(&chosen, request.max_tokens, request.anchors_only);

        let outcome = if entries.is_empty() {
            let available_filters = suggestions::available_filters(&all);
            let suggestions = suggestions::on_miss(request, &available_filters);
            SearchOutcome::NoMatch {
                available_filters,
                suggestions,
            }
        } else {
            match strategy {
                Some(strategy) => SearchOutcome::Matched {
                    strategy,
                    fallback: (strategies_used.len() > 1).then_some(strategy),
                },
                None => SearchOutcome::Unqueried,
            }
        };

        let tool_suggestions = suggestions::tool_suggestions(query, &chosen);
        let related_searches = suggestions::related_searches(query, &chosen);

        let time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let label = match &outcome {
            SearchOutcome::Matched { strategy, .. } => strategy.as_str(),
            SearchOutcome::Unqueried => "unqueried",
            SearchOutcome::NoMatch { .. } => "none",
        };
        metrics::counter!("waymark_search_total", "strategy" => label).increment(1);
        metrics::histogram!("waymark_search_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(
            strategy = label,
            candidates = all.len(),
            pool = pool.len(),
            returned = entries.len(),
            total_tokens,
            "Search completed"
        );

        Ok(RetrievalResult {
            entries,
            total_tokens,
            query: request.query.clone(),
            outcome,
            metrics: SearchMetrics {
                candidates_evaluated: all.len(),
                strategies_used,
                time_ms,
            },
            tool_suggestions,
            related_searches,
        })
    }
}

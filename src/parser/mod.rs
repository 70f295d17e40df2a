//! Marker parser.
//!
//! Converts annotated text into a [`ParsedDocument`]. Parsing never fails:
//! malformed or ambiguous input is recorded in [`ParsedDocument::errors`] and
//! the remaining scans continue unaffected.
//!
//! # Marker grammar
//!
//! | Kind | Syntax |
//! |------|--------|
//! | State | `{state:x}`, `{state:intensity\|x[0.8]\|}`, `{state:weighted\|x[0.6]\|y\|}`, `{state:random!x[0.5]!y[0.5]!}` |
//! | Context | `[context:x]` |
//! | Pattern | `&pattern:category\|flow\|`, `&status:category\|` |
//! | Directional | `→ ← ↔ ↠ ⇄`, enhanced `⇉ ⇇ ⇋ ↔↔ →→ ←←` |
//! | Branch | `{branch:id\|label}`, `→merge{branch:id}`, `{branch_end:id}` |
//! | Social | `{social:level}[mask:name]` |
//!
//! # Example
//!
//! ```rust
//! use waymark::parser::parse;
//!
//! let doc = parse("I am {state:analytical} about this problem");
//! assert_eq!(doc.states.len(), 1);
//! assert_eq!(doc.states[0].span.start, 5);
//! assert!(doc.is_clean());
//! ```

mod markers;
pub mod patterns;
mod ranges;
mod states;

pub use ranges::ClaimedRanges;
pub use states::{WEIGHT_TOLERANCE, weight_sum, weighted_values};

use crate::models::{BranchMarker, DocumentStatistics, ParsedDocument, StateMarker, StateType};
use std::collections::HashSet;

/// Unique branch ids at which branch complexity saturates.
const BRANCH_COMPLEXITY_SCALE: f64 = 10.0;

/// Parses annotated text into a structured document.
#[must_use]
pub fn parse(text: &str) -> ParsedDocument {
    let mut errors = Vec::new();

    let states = states::scan(text, &mut errors);
    let contexts = markers::scan_contexts(text, &mut errors);
    let patterns = markers::scan_patterns(text);
    let merges = markers::merge_ranges(text);
    let directionals = markers::scan_directionals(text, &merges);
    let branches = markers::scan_branches(text, &merges);
    let social_layers = markers::scan_social_layers(text);

    let total_markers = states.len()
        + contexts.len()
        + patterns.len()
        + directionals.len()
        + branches.len()
        + social_layers.len();

    let statistics = DocumentStatistics {
        total_markers,
        marker_density: marker_density(total_markers, text),
        dominant_state_type: dominant_state_type(&states),
        branch_complexity: branch_complexity(&branches),
    };

    metrics::counter!("waymark_parse_total").increment(1);
    if !errors.is_empty() {
        metrics::counter!("waymark_parse_errors_total").increment(errors.len() as u64);
    }
    tracing::trace!(total_markers, errors = errors.len(), "Parsed markers");

    ParsedDocument {
        text: text.to_string(),
        states,
        contexts,
        patterns,
        directionals,
        branches,
        social_layers,
        errors,
        statistics,
    }
}

/// Markers per 100 characters; 0 for empty text.
#[allow(clippy::cast_precision_loss)]
fn marker_density(total_markers: usize, text: &str) -> f64 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0.0;
    }
    total_markers as f64 / chars as f64 * 100.0
}

/// Plurality state type; ties go to the earlier of simple, intensity,
/// weighted, random.
fn dominant_state_type(states: &[StateMarker]) -> Option<StateType> {
    let mut best: Option<(StateType, usize)> = None;
    for state_type in StateType::ALL {
        let count = states
            .iter()
            .filter(|s| s.state_type() == state_type)
            .count();
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((state_type, count));
        }
    }
    best.map(|(t, _)| t)
}

#[allow(clippy::cast_precision_loss)]
fn branch_complexity(branches: &[BranchMarker]) -> f64 {
    let unique: HashSet<&str> = branches.iter().map(|b| b.id.as_str()).collect();
    (unique.len() as f64 / BRANCH_COMPLEXITY_SCALE).min(1.0)
}

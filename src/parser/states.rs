//! State marker scans.
//!
//! Four independent scans (simple, intensity, weighted, random) plus two
//! problem scans (malformed and nested markers). Weighted and random markers
//! are sum-checked; a failing marker is still emitted.

use super::patterns::{
    BRACE_GROUP, INTENSITY_STATE, MALFORMED_STATE, MEASURED_VALUE, NESTED_STATE,
    NESTED_WEIGHTED_BODY, RANDOM_STATE, SIMPLE_STATE, WEIGHTED_STATE, WEIGHTED_VALUE,
};
use crate::models::{IntensityValue, ParseError, Span, StateKind, StateMarker, WeightedValue};
use regex::Match;

/// Allowed distance between a distribution's weight sum and 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.001;

/// Placeholder label substituted for a nested brace group.
const NESTED_PLACEHOLDER: &str = "nested";

/// Extracts every state marker from `text`, sorted by start offset.
pub fn scan(text: &str, errors: &mut Vec<ParseError>) -> Vec<StateMarker> {
    let mut states = Vec::new();

    for caps in SIMPLE_STATE.captures_iter(text) {
        let (span, raw) = located(&caps, 0);
        states.push(StateMarker {
            kind: StateKind::Simple {
                value: caps[1].to_string(),
            },
            span,
            raw,
        });
    }

    for caps in INTENSITY_STATE.captures_iter(text) {
        let (span, raw) = located(&caps, 0);
        let values = MEASURED_VALUE
            .captures_iter(&caps[1])
            .map(|v| IntensityValue {
                state: v[1].to_string(),
                intensity: parse_number(&v[2]),
            })
            .collect();
        states.push(StateMarker {
            kind: StateKind::Intensity { values },
            span,
            raw,
        });
    }

    for caps in WEIGHTED_STATE.captures_iter(text) {
        let (span, raw) = located(&caps, 0);
        let shorthand = caps.get(1).map(|m| m.as_str());
        let values = weighted_values(&caps[2], shorthand);
        check_sum("Weighted", &values, span, errors);
        states.push(StateMarker {
            kind: StateKind::Weighted { values },
            span,
            raw,
        });
    }

    for caps in RANDOM_STATE.captures_iter(text) {
        let (span, raw) = located(&caps, 0);
        let values: Vec<WeightedValue> = MEASURED_VALUE
            .captures_iter(&caps[1])
            .map(|v| WeightedValue {
                state: v[1].to_string(),
                weight: parse_number(&v[2]),
            })
            .collect();
        check_sum("Random", &values, span, errors);
        states.push(StateMarker {
            kind: StateKind::Random { values },
            span,
            raw,
        });
    }

    for m in MALFORMED_STATE.find_iter(text) {
        errors.push(ParseError::syntax("Malformed state marker", span_of(&m)));
    }

    for m in NESTED_STATE.find_iter(text) {
        let span = span_of(&m);
        errors.push(ParseError::syntax(
            "Nested structures are not allowed within state markers",
            span,
        ));
        if let Some(marker) = degraded_weighted(m.as_str(), span, errors) {
            states.push(marker);
        }
    }

    states.sort_by_key(|s| s.span.start);
    states
}

/// Best-effort weighted marker for a nested fragment, with inner brace
/// groups replaced by a placeholder label.
fn degraded_weighted(raw: &str, span: Span, errors: &mut Vec<ParseError>) -> Option<StateMarker> {
    let body = NESTED_WEIGHTED_BODY.captures(raw)?;
    let simplified = BRACE_GROUP.replace_all(&body[1], NESTED_PLACEHOLDER);
    let values = weighted_values(&simplified, None);
    check_sum("Weighted", &values, span, errors);
    Some(StateMarker {
        kind: StateKind::Weighted { values },
        span,
        raw: raw.to_string(),
    })
}

/// Resolves a weighted value list.
///
/// Labels with an explicit weight keep it. The shorthand label (if any) and
/// every label without a weight split `1.0 - Σexplicit` evenly; with no such
/// labels nothing is distributed and the sum check reports any mismatch.
pub fn weighted_values(body: &str, shorthand: Option<&str>) -> Vec<WeightedValue> {
    let mut labels: Vec<(String, Option<f64>)> = Vec::new();
    if let Some(label) = shorthand {
        labels.push((label.to_string(), None));
    }
    for caps in WEIGHTED_VALUE.captures_iter(body) {
        let weight = caps.get(2).map(|w| parse_number(w.as_str()));
        labels.push((caps[1].to_string(), weight));
    }

    let explicit: f64 = labels.iter().filter_map(|(_, w)| *w).sum();
    let unspecified = labels.iter().filter(|(_, w)| w.is_none()).count();
    let share = if unspecified > 0 {
        #[allow(clippy::cast_precision_loss)]
        let count = unspecified as f64;
        (1.0 - explicit) / count
    } else {
        0.0
    };

    labels
        .into_iter()
        .map(|(state, weight)| WeightedValue {
            state,
            weight: weight.unwrap_or(share),
        })
        .collect()
}

/// Returns the sum of a distribution's weights.
#[must_use]
pub fn weight_sum(values: &[WeightedValue]) -> f64 {
    values.iter().map(|v| v.weight).sum()
}

fn check_sum(label: &str, values: &[WeightedValue], span: Span, errors: &mut Vec<ParseError>) {
    let sum = weight_sum(values);
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(ParseError::validation(
            format!("{label} state values must sum to 1.0, got {sum}"),
            span,
        ));
    }
}

fn parse_number(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

fn span_of(m: &Match<'_>) -> Span {
    Span::new(m.start(), m.end())
}

fn located(caps: &regex::Captures<'_>, group: usize) -> (Span, String) {
    caps.get(group).map_or_else(
        || (Span::default(), String::new()),
        |m| (span_of(&m), m.as_str().to_string()),
    )
}

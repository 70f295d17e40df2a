//! Positioned marker types produced by the marker parser.
//!
//! Every marker carries the [`Span`] it was parsed from and the exact `raw`
//! substring. Spans are byte offsets into the original text and are never
//! renumbered after extraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Half-open byte range `[start, end)` into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the span length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if `offset` lies inside the span.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the span as a `Range`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// The four shapes a state marker can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    /// `{state:label}`
    Simple,
    /// `{state:intensity|a[0.5]|b[1.0]|}`
    Intensity,
    /// `{state:weighted|a[0.6]|b|}`
    Weighted,
    /// `{state:random!a[0.5]!b[0.5]!}`
    Random,
}

impl StateType {
    /// All state types, in tie-break order for dominance.
    pub const ALL: [Self; 4] = [Self::Simple, Self::Intensity, Self::Weighted, Self::Random];

    /// Returns the type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Intensity => "intensity",
            Self::Weighted => "weighted",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label with an intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityValue {
    /// State label.
    pub state: String,
    /// Intensity as written.
    pub intensity: f64,
}

/// A label with a weight in a weighted or random distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    /// State label.
    pub state: String,
    /// Weight; all weights of one marker should sum to 1.0.
    pub weight: f64,
}

/// Shape-specific payload of a state marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateKind {
    /// A single label.
    Simple {
        /// The label.
        value: String,
    },
    /// Ordered label/intensity pairs.
    Intensity {
        /// The pairs in written order.
        values: Vec<IntensityValue>,
    },
    /// Ordered label/weight pairs.
    Weighted {
        /// The pairs in written order.
        values: Vec<WeightedValue>,
    },
    /// Ordered label/weight pairs describing a random distribution.
    Random {
        /// The pairs in written order.
        values: Vec<WeightedValue>,
    },
}

/// A cognitive-state marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMarker {
    /// Shape and values.
    #[serde(flatten)]
    pub kind: StateKind,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

impl StateMarker {
    /// Returns the shape of this marker.
    #[must_use]
    pub const fn state_type(&self) -> StateType {
        match self.kind {
            StateKind::Simple { .. } => StateType::Simple,
            StateKind::Intensity { .. } => StateType::Intensity,
            StateKind::Weighted { .. } => StateType::Weighted,
            StateKind::Random { .. } => StateType::Random,
        }
    }

    /// Returns the label of a simple state marker.
    #[must_use]
    pub fn simple_value(&self) -> Option<&str> {
        match &self.kind {
            StateKind::Simple { value } => Some(value),
            _ => None,
        }
    }
}

/// A context marker: `[context:label]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMarker {
    /// The context label.
    pub value: String,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

/// Whether a pattern marker describes a dynamic flow or a static status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `&pattern:category|flow|`
    Pattern,
    /// `&status:category|`
    Status,
}

/// A pattern or status marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMarker {
    /// Dynamic pattern or static status.
    pub kind: PatternKind,
    /// Behaviour category.
    pub category: String,
    /// Flow label; always `None` for status markers.
    pub flow: Option<String>,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

/// Flow direction of a directional operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `→`
    Forward,
    /// `←`
    Backward,
    /// `↔`
    Bidirectional,
    /// `↠`
    Transition,
    /// `⇄`
    Cascade,
}

/// A directional operator glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalOperator {
    /// Flow direction.
    pub direction: Direction,
    /// True for intensified (multi-glyph or double-arrow) operators.
    pub enhanced: bool,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

/// Branch marker variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BranchKind {
    /// `{branch:id|label}`
    Init {
        /// Optional human label.
        label: Option<String>,
    },
    /// `→merge{branch:id}`
    Merge,
    /// `{branch_end:id}`
    End,
}

/// A branch marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMarker {
    /// Init, merge or end.
    #[serde(flatten)]
    pub kind: BranchKind,
    /// Branch identifier.
    pub id: String,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

/// A social layer marker: `{social:level}[mask:name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLayer {
    /// Social register.
    pub level: String,
    /// Optional presentation mask.
    pub mask: Option<String>,
    /// Location in the original text.
    pub span: Span,
    /// Exact source substring.
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains_is_half_open() {
        let span = Span::new(5, 10);
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10));
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_state_marker_serializes_with_type_tag() {
        let marker = StateMarker {
            kind: StateKind::Simple {
                value: "focused".to_string(),
            },
            span: Span::new(0, 15),
            raw: "{state:focused}".to_string(),
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["type"], "simple");
        assert_eq!(json["value"], "focused");

        let back: StateMarker = serde_json::from_value(json).unwrap();
        assert_eq!(back, marker);
    }
}

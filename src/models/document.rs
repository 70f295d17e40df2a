//! Parsed document returned by the marker parser.

use super::marker::{
    BranchMarker, ContextMarker, DirectionalOperator, PatternMarker, SocialLayer, Span,
    StateMarker, StateType,
};
use serde::{Deserialize, Serialize};

/// Category of a parse problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Malformed, nested or unknown marker syntax.
    Syntax,
    /// Well-formed marker with invalid values (e.g. weights not summing to 1.0).
    Validation,
}

/// A non-fatal problem recorded while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Offending range.
    pub span: Span,
    /// Syntax or validation.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ParseErrorKind::Syntax,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ParseErrorKind::Validation,
        }
    }
}

/// Document-level statistics derived from the marker lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentStatistics {
    /// Sum of all six marker list lengths.
    pub total_markers: usize,
    /// Markers per 100 characters of text.
    pub marker_density: f64,
    /// Most frequent state marker shape, if any state markers exist.
    pub dominant_state_type: Option<StateType>,
    /// `min(1, unique branch ids / 10)`.
    pub branch_complexity: f64,
}

/// The structured result of parsing annotated text.
///
/// Each marker list is sorted by start offset; the lists are independent and
/// not interleaved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// The original text.
    pub text: String,
    /// State markers.
    pub states: Vec<StateMarker>,
    /// Context markers.
    pub contexts: Vec<ContextMarker>,
    /// Pattern and status markers.
    pub patterns: Vec<PatternMarker>,
    /// Directional operators.
    pub directionals: Vec<DirectionalOperator>,
    /// Branch markers.
    pub branches: Vec<BranchMarker>,
    /// Social layer markers.
    pub social_layers: Vec<SocialLayer>,
    /// Syntax and validation problems, in detection order.
    pub errors: Vec<ParseError>,
    /// Derived statistics.
    pub statistics: DocumentStatistics,
}

impl ParsedDocument {
    /// Returns the labels of all simple state markers.
    pub fn simple_states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().filter_map(StateMarker::simple_value)
    }

    /// Returns the labels of all context markers.
    pub fn context_values(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(|c| c.value.as_str())
    }

    /// Returns the errors of the given kind.
    pub fn errors_of(&self, kind: ParseErrorKind) -> impl Iterator<Item = &ParseError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Returns true if parsing recorded no problems.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

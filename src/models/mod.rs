//! Data models for waymark.
//!
//! Markers, parsed documents, anchors, stored entries and retrieval types.
//! Every type here is plain data and round-trips through `serde`.

mod anchor;
mod checkpoint;
mod document;
mod entry;
mod facets;
mod marker;
mod search;

pub use anchor::{AnchorId, AnchorType, ExtractionMethod, SemanticAnchor};
pub use checkpoint::{CheckpointRequest, CheckpointResult};
pub use document::{DocumentStatistics, ParseError, ParseErrorKind, ParsedDocument};
pub use entry::{ConversationEntry, EntryId, NewEntry};
pub use facets::{ClassificationFacets, FacetDimension};
pub use marker::{
    BranchKind, BranchMarker, ContextMarker, Direction, DirectionalOperator, IntensityValue,
    PatternKind, PatternMarker, SocialLayer, Span, StateKind, StateMarker, StateType,
    WeightedValue,
};
pub use search::{
    AvailableFilters, DEFAULT_MAX_TOKENS, FacetFilter, RetrievalRequest, RetrievalResult,
    RetrievedEntry, SearchCriteria, SearchMetrics, SearchOutcome, SearchStrategy, TimeRange,
    ToolSuggestion,
};

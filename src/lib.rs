//! # Waymark
//!
//! Marker-annotated conversation memory.
//!
//! Waymark parses a compact inline annotation language out of conversation
//! text, detects the decisions, questions, blockers and breakthroughs it
//! contains, stores the result, and retrieves it later through a cascade of
//! progressively looser search strategies.
//!
//! ## Features
//!
//! - Marker parser for states, contexts, patterns, branches and social layers
//! - Semantic anchor detection with confidence scoring and relationship linking
//! - Classification facets for typed filtering
//! - Five-layer retrieval cascade with token budgets and miss suggestions
//! - JSON tool envelope that never leaks an `Err`
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use waymark::{CheckpointRequest, CheckpointService, InMemoryStore, RetrievalEngine, RetrievalRequest};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let checkpoints = CheckpointService::new(store.clone());
//! let saved = checkpoints
//!     .save(CheckpointRequest::new("We decided to use PostgreSQL. [context:storage]"))
//!     .unwrap();
//! assert_eq!(saved.anchors.len(), 1);
//!
//! let engine = RetrievalEngine::new(store);
//! let result = engine.search(&RetrievalRequest::new("postgresql")).unwrap();
//! assert_eq!(result.entries.len(), 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod anchors;
pub mod config;
pub mod facets;
pub mod models;
pub mod observability;
pub mod parser;
pub mod retrieval;
pub mod services;
pub mod storage;
pub mod tools;

pub use anchors::{AnchorConfig, AnchorDetector};
pub use config::WaymarkConfig;
pub use models::{
    AnchorType, CheckpointRequest, CheckpointResult, ConversationEntry, EntryId, ParsedDocument,
    RetrievalRequest, RetrievalResult, SearchCriteria, SearchOutcome, SearchStrategy,
    SemanticAnchor,
};
pub use parser::parse;
pub use retrieval::RetrievalEngine;
pub use services::{AnchorFilter, AnchorQuery, CheckpointService};
pub use storage::{ConversationStore, FilesystemStore, InMemoryStore};
pub use tools::{ToolRegistry, ToolResponse};

/// Error type for waymark operations.
///
/// Malformed markers are not errors; they are reported as
/// [`ParseError`](models::ParseError) data on the parsed document.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty checkpoint content, unknown anchor type, bad config values |
/// | `NotFound` | Loading an entry id the store does not hold |
/// | `OperationFailed` | Filesystem I/O, JSON encoding, poisoned locks, logging setup |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Entry files cannot be read, written or decoded
    /// - A store lock is poisoned
    /// - The config file cannot be read or parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for waymark operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Business logic services.
//!
//! Services orchestrate the parser, the anchor detector and a
//! [`ConversationStore`](crate::storage::ConversationStore) to provide the
//! high-level operations behind the tools.

mod anchor_query;
mod checkpoint;

pub use anchor_query::{AnchorFilter, AnchorQuery, AnchorRecord, DEFAULT_ANCHOR_LIMIT};
pub use checkpoint::{CheckpointService, MAX_SUMMARY_CHARS, summarize};

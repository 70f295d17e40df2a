//! Anchor id generation.

use crate::models::AnchorId;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of anchor ids.
///
/// Implementations must be safe to share across threads; ids must be unique
/// for the lifetime of the generator.
pub trait AnchorIdGenerator: Send + Sync + Debug {
    /// Returns a fresh id.
    fn next_id(&self) -> AnchorId;
}

/// Random UUID v4 ids, unique process-wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidAnchorIds;

impl AnchorIdGenerator for UuidAnchorIds {
    fn next_id(&self) -> AnchorId {
        AnchorId::new(format!("anchor_{}", uuid::Uuid::new_v4().simple()))
    }
}

/// Counter-based ids (`anchor_1`, `anchor_2`, ...), scoped to one generator.
#[derive(Debug, Default)]
pub struct SequentialAnchorIds {
    counter: AtomicU64,
}

impl SequentialAnchorIds {
    /// Creates a counter starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl AnchorIdGenerator for SequentialAnchorIds {
    fn next_id(&self) -> AnchorId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        AnchorId::new(format!("anchor_{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialAnchorIds::new();
        assert_eq!(ids.next_id().as_str(), "anchor_1");
        assert_eq!(ids.next_id().as_str(), "anchor_2");
    }

    #[test]
    fn test_sequential_ids_unique_across_threads() {
        let ids = Arc::new(SequentialAnchorIds::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_uuid_ids_are_prefixed() {
        let id = UuidAnchorIds.next_id();
        assert!(id.as_str().starts_with("anchor_"));
        assert_ne!(id, UuidAnchorIds.next_id());
    }
}

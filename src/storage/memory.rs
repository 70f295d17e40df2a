//! In-memory conversation store.
//!
//! Holds entries in a map guarded by an `RwLock`. Useful for tests and for
//! short-lived sessions that do not need persistence.

use super::ConversationStore;
use crate::models::{ConversationEntry, EntryId};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory conversation store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<EntryId, ConversationEntry>>,
}

fn poisoned(operation: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: "Lock poisoned".to_string(),
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = ConversationEntry>) -> Self {
        let map = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }
}

impl ConversationStore for InMemoryStore {
    fn put(&self, entry: ConversationEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("put_entry"))?;
        tracing::debug!(entry_id = %entry.id, "Storing entry in memory");
        entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn load(&self, id: &EntryId) -> Result<ConversationEntry> {
        let entries = self.entries.read().map_err(|_| poisoned("load_entry"))?;
        entries
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("entry {id}")))
    }

    fn load_all(&self) -> Result<Vec<ConversationEntry>> {
        let entries = self.entries.read().map_err(|_| poisoned("load_all_entries"))?;
        Ok(entries.values().cloned().collect())
    }

    fn delete(&self, id: &EntryId) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned("delete_entry"))?;
        Ok(entries.remove(id).is_some())
    }

    fn count(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| poisoned("count_entries"))?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEntry, SearchCriteria};
    use crate::parser;

    fn new_entry(text: &str) -> NewEntry {
        NewEntry::new(text, parser::parse(text))
    }

    #[test]
    fn test_save_and_load() {
        let store = InMemoryStore::new();
        let id = store.save(new_entry("hello [context:demo]")).unwrap();

        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.content, "hello [context:demo]");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.load(&EntryId::new("missing")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let store = InMemoryStore::new();
        let id = store.save(new_entry("bye")).unwrap();

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_search_filters_by_context() {
        let store = InMemoryStore::new();
        store.save(new_entry("one [context:alpha]")).unwrap();
        store.save(new_entry("two [context:beta]")).unwrap();

        let hits = store
            .search(&SearchCriteria::new().with_context("beta"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "two [context:beta]");
        assert_eq!(store.search(&SearchCriteria::new()).unwrap().len(), 2);
    }
}

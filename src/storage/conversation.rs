//! Conversation store trait.

use crate::models::{ConversationEntry, EntryId, NewEntry, SearchCriteria};
use crate::Result;
use chrono::Utc;

/// Storage collaborator for conversation entries.
///
/// Stores are the authoritative source of truth for entries. Reads never
/// mutate; all methods take `&self` so a store can be shared behind an
/// `Arc` by the retrieval engine and the checkpoint service.
pub trait ConversationStore: Send + Sync {
    /// Stores a fully formed entry, replacing any entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn put(&self, entry: ConversationEntry) -> Result<()>;

    /// Loads an entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no entry has this id.
    fn load(&self, id: &EntryId) -> Result<ConversationEntry>;

    /// Loads every stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry cannot be read.
    fn load_all(&self) -> Result<Vec<ConversationEntry>>;

    /// Deletes an entry, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be removed.
    fn delete(&self, id: &EntryId) -> Result<bool>;

    /// Assigns an id and the current time to `entry` and stores it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    fn save(&self, entry: NewEntry) -> Result<EntryId> {
        let id = EntryId::generate();
        self.put(ConversationEntry::from_new(entry, id.clone(), Utc::now()))?;
        Ok(id)
    }

    /// Returns the entries that satisfy every filtered dimension of
    /// `criteria`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be read.
    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ConversationEntry>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|entry| criteria.matches(entry))
            .collect())
    }

    /// Returns the number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be counted.
    fn count(&self) -> Result<usize> {
        Ok(self.load_all()?.len())
    }
}

//! Storage for conversation entries.
//!
//! | Backend | Persistence | Use |
//! |---------|-------------|-----|
//! | [`InMemoryStore`] | none | tests, short sessions |
//! | [`FilesystemStore`] | one JSON file per entry | default CLI store |

mod conversation;
mod filesystem;
mod memory;

pub use conversation::ConversationStore;
pub use filesystem::FilesystemStore;
pub use memory::InMemoryStore;

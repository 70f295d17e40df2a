//! Filesystem conversation store.
//!
//! Stores each entry as a pretty-printed JSON file named `<id>.json` under a
//! base directory. Writes go to a temporary sibling first and are renamed
//! into place, so a reader never observes a half-written entry.
//!
//! # Security
//!
//! - **Path traversal**: entry ids are validated before they become file names
//! - **File size limits**: oversized files are rejected before they are read

use super::ConversationStore;
use crate::models::{ConversationEntry, EntryId};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Maximum size of one entry file (8MB).
const MAX_FILE_SIZE: u64 = 8 * 1024 * 1024;

fn io_failure(operation: &str, err: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: err.to_string(),
    }
}

/// One-JSON-file-per-entry store.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Opens a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| io_failure("create_storage_dir", e))?;
        tracing::debug!(path = %base_path.display(), "Opened filesystem store");
        Ok(Self { base_path })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, id: &EntryId) -> Result<PathBuf> {
        let id_str = id.as_str();
        if !is_safe_filename(id_str) {
            return Err(Error::InvalidInput(format!(
                "Entry ID contains invalid characters: {id_str}"
            )));
        }
        Ok(self.base_path.join(format!("{id_str}.json")))
    }

    fn read_entry(path: &Path) -> Result<ConversationEntry> {
        let metadata = fs::metadata(path).map_err(|e| io_failure("read_file_metadata", e))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidInput(format!(
                "Entry file exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                path.display()
            )));
        }

        let json = fs::read_to_string(path).map_err(|e| io_failure("read_entry_file", e))?;
        serde_json::from_str(&json).map_err(|e| io_failure("deserialize_entry", e))
    }
}

/// Only alphanumerics, dashes and underscores are allowed.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl ConversationStore for FilesystemStore {
    fn put(&self, entry: ConversationEntry) -> Result<()> {
        let start = Instant::now();
        let path = self.entry_path(&entry.id)?;
        let tmp = path.with_extension("json.tmp");

        let json =
            serde_json::to_string_pretty(&entry).map_err(|e| io_failure("serialize_entry", e))?;
        fs::write(&tmp, json).map_err(|e| io_failure("write_entry_file", e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_failure("rename_entry_file", e)
        })?;

        metrics::counter!("waymark_store_writes_total", "backend" => "filesystem").increment(1);
        metrics::histogram!("waymark_store_write_duration_ms", "backend" => "filesystem")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(entry_id = %entry.id, path = %path.display(), "Stored entry");
        Ok(())
    }

    fn load(&self, id: &EntryId) -> Result<ConversationEntry> {
        let Ok(path) = self.entry_path(id) else {
            return Err(Error::NotFound(format!("entry {id}")));
        };
        if !path.exists() {
            return Err(Error::NotFound(format!("entry {id}")));
        }
        Self::read_entry(&path)
    }

    fn load_all(&self) -> Result<Vec<ConversationEntry>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let dir = fs::read_dir(&self.base_path).map_err(|e| io_failure("read_storage_dir", e))?;
        for item in dir {
            let item = item.map_err(|e| io_failure("read_dir_entry", e))?;
            let path = item.path();
            if is_entry_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let entries = paths
            .iter()
            .map(|path| Self::read_entry(path))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = entries.len(), "Loaded entries from disk");
        Ok(entries)
    }

    fn delete(&self, id: &EntryId) -> Result<bool> {
        let Ok(path) = self.entry_path(id) else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| io_failure("delete_entry_file", e))?;
        Ok(true)
    }

    fn count(&self) -> Result<usize> {
        if !self.base_path.exists() {
            return Ok(0);
        }
        let dir = fs::read_dir(&self.base_path).map_err(|e| io_failure("read_storage_dir", e))?;
        let mut count = 0;
        for item in dir {
            let item = item.map_err(|e| io_failure("read_dir_entry", e))?;
            if is_entry_file(&item.path()) {
                count += 1;
            }
        }
        Ok(count)
    }
}

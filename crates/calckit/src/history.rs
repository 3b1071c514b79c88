//! Append-only calculation history in `{data_dir}/history.json`.

use std::fs;
use std::path::{Path, PathBuf};

use calckit_core::HistoryEntry;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::io::atomic_write;

pub const HISTORY_FILE: &str = "history.json";

/// JSON array of [`HistoryEntry`], oldest first
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(data_dir: &Path, limit: usize) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Append entries, dropping the oldest beyond the configured limit
    pub fn append(&self, new_entries: &[HistoryEntry]) -> Result<usize, StorageError> {
        if new_entries.is_empty() {
            return Ok(0);
        }
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Parse { message, .. }) => {
                warn!("history file unreadable, starting over: {message}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.extend_from_slice(new_entries);
        if entries.len() > self.limit {
            let excess = entries.len() - self.limit;
            entries.drain(..excess);
            debug!(dropped = excess, "history trimmed to limit");
        }
        self.write(&entries)?;
        Ok(entries.len())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.write(&[])
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        atomic_write(&self.path, &json).map_err(|e| StorageError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calckit_core::{CalculationRequest, calculate};
    use tempfile::tempdir;

    fn entry(n: f64) -> HistoryEntry {
        let request = CalculationRequest::new("circular").param("n", n);
        let result = calculate(&request).unwrap();
        HistoryEntry::record(&request, &result)
    }

    #[test]
    fn test_append_and_load() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), 10);
        assert!(store.load().unwrap().is_empty());

        assert_eq!(store.append(&[entry(4.0)]).unwrap(), 1);
        assert_eq!(store.append(&[entry(5.0), entry(6.0)]).unwrap(), 3);

        let loaded = store.load().unwrap();
        let params: Vec<&str> = loaded.iter().map(|e| e.params.as_str()).collect();
        assert_eq!(params, vec!["n=4", "n=5", "n=6"]);
        assert!(loaded[0].result.starts_with("count=6"));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), 2);
        store
            .append(&[entry(3.0), entry(4.0), entry(5.0)])
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].params, "n=4");
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_append() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), 10);
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(StorageError::Parse { .. })));
        assert_eq!(store.append(&[entry(3.0)]).unwrap(), 1);
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path(), 10);
        store.append(&[entry(3.0)]).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}

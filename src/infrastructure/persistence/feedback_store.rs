//! Append-only CSV feedback store.

use crate::domain::errors::StoreError;
use crate::domain::ports::{FeedbackRecord, FeedbackStore};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvFeedbackStore {
    path: PathBuf,
}

impl CsvFeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl FeedbackStore for CsvFeedbackStore {
    /// Idempotent append: an exact (description, category) duplicate is a
    /// no-op. Existing rows are never rewritten.
    fn append(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        let existing = self.load_all()?;
        if existing.contains(record) {
            debug!(description = %record.description, "duplicate feedback ignored");
            return Ok(());
        }

        ensure_parent(&self.path).map_err(|e| self.io_error(e))?;
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(record).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        writer.flush().map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: FeedbackRecord = row.map_err(|e| StoreError::Malformed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(description: &str, category: &str) -> FeedbackRecord {
        FeedbackRecord {
            description: description.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = CsvFeedbackStore::new(dir.path().join("learned.csv"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = CsvFeedbackStore::new(dir.path().join("models/learned.csv"));

        store.append(&record("uber corrida", "Transporte")).unwrap();
        store.append(&record("netflix", "Lazer")).unwrap();

        let rows = store.load_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], record("uber corrida", "Transporte"));
        assert_eq!(rows[1], record("netflix", "Lazer"));
    }

    #[test]
    fn test_duplicate_append_is_noop() {
        let dir = tempdir().unwrap();
        let store = CsvFeedbackStore::new(dir.path().join("learned.csv"));

        let r = record("uber corrida", "Transporte");
        store.append(&r).unwrap();
        store.append(&r).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);

        // Same description under a new category is a distinct record.
        store.append(&record("uber corrida", "Lazer")).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }
}

//! JSON model-artifact store with atomic replacement.
//!
//! The artifact is written to a sibling temp file and renamed over the
//! target, so a reader never observes a partially-written model.

use crate::domain::errors::StoreError;
use crate::domain::ports::ModelStore;
use std::path::PathBuf;
use tracing::info;

pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
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

impl ModelStore for JsonModelStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read(&self.path)
            .map(Some)
            .map_err(|e| self.io_error(e))
    }

    fn save(&self, artifact: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, artifact).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        info!(path = %self.path.display(), bytes = artifact.len(), "model artifact saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_artifact_loads_none() {
        let dir = tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("model.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("models/model.json"));

        store.save(b"{\"version\":1}").unwrap();
        assert_eq!(store.load().unwrap().unwrap(), b"{\"version\":1}");
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let dir = tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("model.json"));

        store.save(b"first").unwrap();
        store.save(b"second").unwrap();
        assert_eq!(store.load().unwrap().unwrap(), b"second");
        // No temp file left behind.
        assert!(!dir.path().join("model.json.tmp").exists());
    }
}

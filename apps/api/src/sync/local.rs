//! Local cache tier: a single JSON document, read once at start and rewritten
//! after every change.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::sync::SyncError;

/// Synchronous read/write contract of the local tier.
pub trait LocalCache: Send + Sync {
    /// `None` when nothing has been cached yet.
    fn read(&self) -> Result<Option<Value>, SyncError>;

    fn write(&self, document: &Value) -> Result<(), SyncError>;

    fn clear(&self) -> Result<(), SyncError>;
}

// ────────────────────────────────────────────────────────────────────────────
// File-backed cache
// ────────────────────────────────────────────────────────────────────────────

/// JSON file written atomically: a temp file in the same directory is renamed over
/// the target, so a crash never leaves a half-written cache behind.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl LocalCache for FileCache {
    fn read(&self) -> Result<Option<Value>, SyncError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, document: &Value) -> Result<(), SyncError> {
        fs::create_dir_all(self.dir())?;
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        serde_json::to_writer(&mut tmp, document)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| SyncError::Io(e.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SyncError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory cache
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryCache {
    slot: Mutex<Option<Value>>,
}

impl MemoryCache {
    pub fn with_document(document: Value) -> Self {
        MemoryCache {
            slot: Mutex::new(Some(document)),
        }
    }
}

impl LocalCache for MemoryCache {
    fn read(&self) -> Result<Option<Value>, SyncError> {
        Ok(self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn write(&self, document: &Value) -> Result<(), SyncError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(document.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SyncError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_cache_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("cache.json"));
        assert!(cache.read().unwrap().is_none());
    }

    #[test]
    fn test_file_cache_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested").join("cache.json"));
        let doc = json!({"skills": ["Rust"]});
        cache.write(&doc).unwrap();
        assert_eq!(cache.read().unwrap(), Some(doc));

        cache.write(&json!({"skills": []})).unwrap();
        assert_eq!(cache.read().unwrap(), Some(json!({"skills": []})));
    }

    #[test]
    fn test_file_cache_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("cache.json"));
        cache.write(&json!({})).unwrap();
        cache.clear().unwrap();
        cache.clear().unwrap();
        assert!(cache.read().unwrap().is_none());
    }

    #[test]
    fn test_file_cache_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"{not json").unwrap();
        let err = FileCache::new(path).read().unwrap_err();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::default();
        assert!(cache.read().unwrap().is_none());
        cache.write(&json!({"a": 1})).unwrap();
        assert_eq!(cache.read().unwrap(), Some(json!({"a": 1})));
        cache.clear().unwrap();
        assert!(cache.read().unwrap().is_none());
    }
}

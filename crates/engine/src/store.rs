//! JSON file backed key/value store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::store::{ensure_version, KeyValueStore, StoreError, StoreValue};

/// Flat JSON object on disk, loaded once and written on [`flush`].
///
/// [`flush`]: KeyValueStore::flush
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, StoreValue>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open `path`. A missing file starts empty; an unreadable or corrupt
    /// file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = values.len(), "store opened");
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    /// Open `path` and wipe it when its version tag differs from `version`.
    ///
    /// A corrupt file is logged and replaced with an empty store so the
    /// session never fails to start over persisted state.
    pub fn open_versioned(path: impl Into<PathBuf>, version: &str) -> Self {
        let path = path.into();
        let mut store = match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store unreadable; starting empty");
                Self {
                    path,
                    values: BTreeMap::new(),
                    dirty: true,
                }
            }
        };
        ensure_version(&mut store, version);
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<&StoreValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: StoreValue) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        self.dirty |= removed;
        removed
    }

    fn delete_all(&mut self) {
        if !self.values.is_empty() {
            self.values.clear();
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        debug!(path = %self.path.display(), "store flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::VERSION_KEY;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut s = JsonFileStore::open(&path).unwrap();
        s.set_int("level.quiz", 4);
        s.set_string("name", "ada");
        s.flush().unwrap();
        assert!(!s.is_dirty());

        let s2 = JsonFileStore::open(&path).unwrap();
        assert_eq!(s2.get_int("level.quiz", 1), 4);
        assert_eq!(s2.get_string("name", ""), "ada");
    }

    #[test]
    fn test_version_mismatch_wipes_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut s = JsonFileStore::open_versioned(&path, "1");
        s.set_int("level.quiz", 9);
        s.flush().unwrap();

        let s2 = JsonFileStore::open_versioned(&path, "2");
        assert!(!s2.has_key("level.quiz"));
        assert_eq!(s2.get_string(VERSION_KEY, ""), "2");
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
        let s = JsonFileStore::open_versioned(&path, "1");
        assert!(s.is_dirty());
        assert_eq!(s.get_string(VERSION_KEY, ""), "1");
    }
}

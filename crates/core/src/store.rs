//! Persistent key/value store contract.
//!
//! The level counter and the "tutorial shown" flag live in a host-provided
//! store. Values are plain integers or strings; a `store.version` key lets the
//! host wipe everything when its schema changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Key holding the schema version of a store.
pub const VERSION_KEY: &str = "store.version";

/// Key set to `1` once the tutorial has been started.
pub const TUTORIAL_SHOWN_KEY: &str = "tutorial.shown";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Int(i64),
    Str(String),
}

/// Host key/value storage.
///
/// Reads take a default returned for missing keys or keys holding the other
/// value type. Writes are in memory until [`flush`](KeyValueStore::flush).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&StoreValue>;

    fn set(&mut self, key: &str, value: StoreValue);

    fn remove(&mut self, key: &str) -> bool;

    fn delete_all(&mut self);

    /// Persist pending writes.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(StoreValue::Int(v)) => *v,
            _ => default,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, StoreValue::Int(value));
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(StoreValue::Str(v)) => v.clone(),
            _ => default.to_string(),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, StoreValue::Str(value.to_string()));
    }
}

/// Wipe `store` when its version tag differs from `version`, then stamp it.
///
/// Returns `true` when the store was wiped.
pub fn ensure_version(store: &mut dyn KeyValueStore, version: &str) -> bool {
    let stored = match store.get(VERSION_KEY) {
        Some(StoreValue::Str(v)) => Some(v.clone()),
        Some(StoreValue::Int(v)) => Some(v.to_string()),
        None => None,
    };
    let wiped = match stored.as_deref() {
        Some(v) if v == version => false,
        Some(v) => {
            warn!(stored = v, expected = version, "store version changed; wiping");
            store.delete_all();
            true
        }
        None => {
            info!(version, "stamping new store");
            false
        }
    };
    store.set_string(VERSION_KEY, version);
    wiped
}

/// In-memory store, used in tests and when persistence is unavailable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    values: BTreeMap<String, StoreValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: BTreeMap<String, StoreValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &BTreeMap<String, StoreValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&StoreValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: StoreValue) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    fn delete_all(&mut self) {
        self.values.clear();
    }
}

//! In-memory key-value store.

use super::{KeyValueStore, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared in-memory store.
///
/// Clones share the same map, so a test can hand one clone to a repository
/// and inspect writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.into(), value.into());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::store::KeyValueStore;

    #[test]
    fn missing_key_reads_as_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("contacts").unwrap(), None);
    }

    #[test]
    fn clones_share_written_values() {
        let store = MemoryStore::new();
        let observer = store.clone();
        store.set("contacts", "[]").unwrap();
        store.set("contacts", "[1]").unwrap();
        assert_eq!(observer.get("contacts").unwrap().as_deref(), Some("[1]"));
    }
}

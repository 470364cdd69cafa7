//! In-memory key-value medium.

use std::collections::HashMap;
use std::sync::RwLock;

use lens_core::error::{LensError, Result};
use lens_core::history::KeyValueStore;

/// A `HashMap` behind a lock, optionally bounded like the file store.
///
/// Used for `--ephemeral` runs and as the fake medium in tests.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
    capacity_bytes: Option<u64>,
}

impl InMemoryKeyValueStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding at most `capacity_bytes` across all keys.
    pub fn with_capacity(capacity_bytes: u64) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    /// Pre-populates a key, bypassing the capacity check.
    pub fn seeded(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn poisoned() -> LensError {
        LensError::internal("in-memory store lock poisoned")
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;

        if let Some(capacity) = self.capacity_bytes {
            let others: u64 = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            let required = others + value.len() as u64;
            if required > capacity {
                return Err(LensError::storage_full(format!(
                    "{required} bytes needed, capacity is {capacity} bytes"
                )));
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_round_trip() {
        let store = InMemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_capacity_enforced() {
        let store = InMemoryKeyValueStore::with_capacity(4);
        store.set("k", "1234").unwrap();
        assert!(store.set("k", "12345").unwrap_err().is_storage_full());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn test_seeded_value_visible() {
        let store = InMemoryKeyValueStore::seeded("lifestyle_lens_history", "{oops");
        assert_eq!(
            store.get("lifestyle_lens_history").unwrap().as_deref(),
            Some("{oops")
        );
    }
}

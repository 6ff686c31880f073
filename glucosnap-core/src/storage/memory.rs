use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// In-process storage, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates `key` with a raw value, bypassing the gateway.
    pub fn with_value(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
        self
    }

    /// Makes every subsequent `set` fail.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Returns the raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Backend(format!(
                "cannot write '{}': store is read-only",
                key
            )));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.raw("k").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let store = MemoryStore::new().with_value("k", "old").read_only();

        assert!(store.set("k", "new").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_with_value_recovers_poisoned_lock() {
        let store = MemoryStore::new();
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.values.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(poisoned.is_err());
        assert!(store.values.is_poisoned());

        let store = store.with_value("k", "v");
        assert_eq!(store.raw("k").as_deref(), Some("v"));
    }
}

//! # In-Memory Store
//!
//! A `HashMap` behind an async lock. Clones share the same map, so a test
//! can hand one clone to the cart and inspect the record through another.
//! The store can be switched "offline" to exercise write-failure handling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with one record.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(key.into(), value.into());
        MemoryStore {
            entries: Arc::new(RwLock::new(map)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// While offline, every operation fails with `StorageError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_online()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_online()?;
        debug!(key = %key, bytes = value.len(), "memory store write");
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.check_online()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{LocalStorage, StorageError, validate_key};

/// Process-local key/value store.
///
/// Cheaply cloneable; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.items.write().await.remove(key);
        Ok(())
    }
}

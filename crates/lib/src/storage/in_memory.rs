//! In-memory durable store
//!
//! Suitable for tests and ephemeral sessions. Nothing is persisted unless
//! [`InMemoryStore::save_to_file`] is called; [`InMemoryStore::load_from_file`]
//! restores a previously saved snapshot.

use std::{collections::BTreeMap, path::Path};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    DurableStore,
    persistence::{read_snapshot, write_snapshot},
};
use crate::Result;

/// A [`DurableStore`] backed by a map behind an async read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Saves every key to `path` as a JSON snapshot.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entries = self.entries.read().await.clone();
        write_snapshot(path.as_ref(), &entries).await
    }

    /// Loads a store from a JSON snapshot. A missing file yields an empty store.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let entries = read_snapshot(path.as_ref()).await?;
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

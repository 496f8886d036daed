use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nh_core::{Error, ObjectStore, Result};
use tokio::sync::RwLock;

/// Process-local store, used by tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.read().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("memory://{}", key)))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.write().await.insert(key.to_string(), bytes);
        Ok(())
    }
}

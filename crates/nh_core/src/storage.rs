use async_trait::async_trait;

use crate::Result;

/// Blob storage addressed by slash-separated keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Read a blob. A missing key is [`crate::Error::NotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Write a blob, replacing any previous value under `key`.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

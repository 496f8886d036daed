use std::sync::Arc;

use nh_core::config::Settings;
use nh_core::{Error, ObjectStore, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod backends;
pub mod dated;
pub mod index;
pub mod keys;

pub use backends::*;
pub use index::{load_latest_snapshot, load_snapshot, publish_snapshot, FlatIndex, IndexManifest, VectorIndexSnapshot};

/// Build the object store selected by `kind` (`memory`, `fs` or `gcs`).
pub fn create_store(kind: &str, settings: &Settings) -> Result<Arc<dyn ObjectStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "fs" => Ok(Arc::new(FsStore::new(settings.storage_root.clone()))),
        "gcs" => Ok(Arc::new(GcsStore::new(
            settings.bucket.clone(),
            settings.gcs_access_token.clone(),
            settings.request_timeout,
        )?)),
        other => Err(Error::Config(format!(
            "Unknown storage backend '{}'. Available backends: memory, fs, gcs",
            other
        ))),
    }
}

pub async fn get_json<T: DeserializeOwned>(store: &dyn ObjectStore, key: &str) -> Result<T> {
    let bytes = store.get(key).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn put_json<T: Serialize + ?Sized>(store: &dyn ObjectStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, bytes).await
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::dated::*;
    pub use super::index::*;
    pub use super::keys::*;
    pub use super::{create_store, get_json, put_json};
    pub use nh_core::ObjectStore;
}

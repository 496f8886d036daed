use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use nh_core::{Error, ObjectStore, Result};
use tokio::fs;

/// Local directory store. Writes go through a temp file and a rename, so a
/// reader never sees a half-written blob.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(Error::Storage(format!("Invalid object key: {:?}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("tmp-{}-{}", std::process::id(), n));
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!("💾 Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

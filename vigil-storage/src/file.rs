use crate::CacheStore;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use vigil_types::CacheSnapshot;

/// One pretty-printed JSON file per key under a data directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// sees either the previous batch or the new one.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            || key.starts_with('.')
        {
            bail!("Invalid cache key `{}`", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<CacheSnapshot>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let decoded = serde_json::from_slice(&bytes)
                    .map_err(|e| anyhow!("Deserialization error in {}: {}", path.display(), e))?;
                Ok(Some(decoded))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow!("Cache read error for {}: {}", path.display(), e)),
        }
    }

    async fn set(&self, key: &str, snapshots: &[CacheSnapshot]) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let encoded = serde_json::to_vec_pretty(snapshots).map_err(|e| anyhow!("Serialization error: {}", e))?;

        tokio::fs::write(&tmp, &encoded)
            .await
            .with_context(|| format!("Cache write error for {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Cache rename error for {}", path.display()))?;
        debug!("Wrote {} snapshots to {}", snapshots.len(), path.display());
        Ok(())
    }
}

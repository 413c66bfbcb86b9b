use crate::CacheStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rocksdb::{Options, DB};
use std::sync::Arc;
use vigil_types::CacheSnapshot;

/// RocksDB-backed cache; values are bincode-encoded snapshot lists.
pub struct RocksCache {
    db: Arc<DB>,
}

impl RocksCache {
    pub fn new(path: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path).map_err(|e| anyhow!("Failed to open DB: {}", e))?;
        Ok(Self { db: Arc::new(db) })
    }

    fn db_key(key: &str) -> String {
        format!("snapshots_{}", key)
    }
}

#[async_trait]
impl CacheStore for RocksCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<CacheSnapshot>>> {
        let db = self.db.clone();
        let db_key = Self::db_key(key);
        tokio::task::spawn_blocking(move || match db.get(db_key.as_bytes()) {
            Ok(Some(value)) => {
                let decoded: Vec<CacheSnapshot> =
                    bincode::deserialize(&value).map_err(|e| anyhow!("Deserialization error: {}", e))?;
                Ok(Some(decoded))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(anyhow!("DB read error: {}", e)),
        })
        .await?
    }

    async fn set(&self, key: &str, snapshots: &[CacheSnapshot]) -> Result<()> {
        let db = self.db.clone();
        let db_key = Self::db_key(key);
        let encoded = bincode::serialize(snapshots).map_err(|e| anyhow!("Serialization error: {}", e))?;
        tokio::task::spawn_blocking(move || {
            db.put(db_key.as_bytes(), encoded)
                .map_err(|e| anyhow!("DB write error: {}", e))
        })
        .await?
    }
}

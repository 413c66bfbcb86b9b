use crate::CacheStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use vigil_types::CacheSnapshot;

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<CacheSnapshot>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<CacheSnapshot>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, snapshots: &[CacheSnapshot]) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), snapshots.to_vec());
        Ok(())
    }
}

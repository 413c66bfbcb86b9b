pub mod file;
pub mod memory;

#[cfg(feature = "rocksdb")]
pub mod db;

use anyhow::Result;
use async_trait::async_trait;
use vigil_types::CacheSnapshot;

pub use file::FileCache;
pub use memory::MemoryCache;

#[cfg(feature = "rocksdb")]
pub use db::RocksCache;

/// Durable home for controller snapshots. Each controller owns one key and
/// always replaces the whole list.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<CacheSnapshot>>>;
    async fn set(&self, key: &str, snapshots: &[CacheSnapshot]) -> Result<()>;
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vigil_codec::DiscriminatorTable;
use vigil_gateway::{Commitment, RpcConfig};
use vigil_monitor::{default_cache_key, ControllerConfig, DEFAULT_MAX_CONCURRENCY};
use vigil_types::{AccountKind, Pubkey};

fn default_rpc_url() -> String {
    "http://127.0.0.1:8899".to_string()
}

fn default_tick_secs() -> u64 {
    60
}

fn default_api_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_scale() -> f64 {
    1.0
}

fn default_confirm_timeout_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_price_timeout_secs() -> u64 {
    vigil_gateway::PRICE_REQUEST_TIMEOUT.as_secs()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub commitment: Commitment,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// JSON byte-array keypair. Without it no controller can be built.
    pub keypair_path: Option<PathBuf>,
    pub program_id: Pubkey,
    #[serde(default = "default_tick_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_api_listen")]
    pub api_listen: SocketAddr,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub prices: PriceConfig,
    #[serde(default)]
    pub discriminators: DiscriminatorTable,
    pub protection: Option<KindConfig>,
    pub dca: Option<KindConfig>,
    pub price_trade: Option<KindConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CacheConfig {
    Memory,
    /// Defaults to `<data-dir>/cache`.
    File {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Rocksdb {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::File { path: None }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceConfig {
    /// Fixed quotes by token mint.
    #[serde(default, rename = "static")]
    pub fixed: HashMap<Pubkey, f64>,
    /// CoinGecko coin ids by token mint. Takes precedence over `static`.
    #[serde(default)]
    pub coingecko: HashMap<Pubkey, String>,
    #[serde(default)]
    pub coingecko_url: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_price_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            fixed: HashMap::new(),
            coingecko: HashMap::new(),
            coingecko_url: None,
            scale: default_scale(),
            request_timeout_secs: default_price_timeout_secs(),
        }
    }
}

/// One controller. A kind with no section is not monitored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    pub accounts: Option<Vec<Pubkey>>,
    #[serde(default)]
    pub cache_key: Option<String>,
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    #[serde(default)]
    pub tick_interval_secs: Option<u64>,
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn rpc(&self) -> RpcConfig {
        let mut rpc = RpcConfig::new(self.rpc_url.clone());
        rpc.commitment = self.commitment;
        rpc.confirm_timeout = Duration::from_secs(self.confirm_timeout_secs);
        rpc.request_timeout = Duration::from_secs(self.request_timeout_secs);
        rpc
    }

    fn section(&self, kind: AccountKind) -> Option<&KindConfig> {
        match kind {
            AccountKind::Protection => self.protection.as_ref(),
            AccountKind::Dca => self.dca.as_ref(),
            AccountKind::PriceTrade => self.price_trade.as_ref(),
        }
    }

    /// Controller settings for every configured kind, in kind order.
    pub fn controllers(&self) -> Vec<ControllerConfig> {
        AccountKind::ALL
            .iter()
            .filter_map(|&kind| {
                let section = self.section(kind)?;
                Some(ControllerConfig {
                    kind,
                    program_id: self.program_id,
                    accounts: section.accounts.clone(),
                    tick_interval: Duration::from_secs(section.tick_interval_secs.unwrap_or(self.tick_interval_secs)),
                    cache_key: section.cache_key.clone().unwrap_or_else(|| default_cache_key(kind)),
                    max_concurrency: section.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
                    discriminators: self.discriminators,
                })
            })
            .collect()
    }

    pub fn cache_path(&self, data_dir: &Path) -> Option<PathBuf> {
        match &self.cache {
            CacheConfig::Memory => None,
            CacheConfig::File { path } => Some(path.clone().unwrap_or_else(|| data_dir.join("cache"))),
            CacheConfig::Rocksdb { path } => Some(path.clone().unwrap_or_else(|| data_dir.join("rocksdb"))),
        }
    }
}

mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{CacheConfig, NodeConfig, PriceConfig};
use prometheus_client::registry::Registry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vigil_api::AppState;
use vigil_gateway::{ChainGateway, HttpPriceSource, Keypair, PriceSource, RpcGateway, StaticPriceSource};
use vigil_gateway::price::COINGECKO_API;
use vigil_monitor::{Controller, ControllerMetrics};
use vigil_storage::{CacheStore, FileCache, MemoryCache};
use vigil_types::AccountKind;

#[derive(Parser, Debug)]
#[command(author, version, about = "Vigil automation keeper node", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "vigil.json")]
    config: PathBuf,
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn open_cache(config: &NodeConfig, data_dir: &Path) -> Result<Arc<dyn CacheStore>> {
    let path = config.cache_path(data_dir);
    match (&config.cache, path) {
        (CacheConfig::Memory, _) => {
            warn!("Using in-memory cache; monitored accounts will not survive a restart");
            Ok(Arc::new(MemoryCache::new()))
        }
        (CacheConfig::File { .. }, Some(path)) => {
            info!("File cache at {}", path.display());
            Ok(Arc::new(FileCache::new(&path)?))
        }
        #[cfg(feature = "rocksdb")]
        (CacheConfig::Rocksdb { .. }, Some(path)) => {
            info!("RocksDB cache at {}", path.display());
            let path = path.to_str().context("RocksDB path is not valid UTF-8")?;
            Ok(Arc::new(vigil_storage::RocksCache::new(path)?))
        }
        #[cfg(not(feature = "rocksdb"))]
        (CacheConfig::Rocksdb { .. }, Some(_)) => {
            bail!("RocksDB cache requested but vigil-node was built without the `rocksdb` feature")
        }
        (_, None) => bail!("No path for the configured cache backend"),
    }
}

fn price_source(prices: &PriceConfig) -> Result<Arc<dyn PriceSource>> {
    if !prices.coingecko.is_empty() {
        info!("CoinGecko quotes for {} tokens (scale {})", prices.coingecko.len(), prices.scale);
        let base_url = prices.coingecko_url.as_deref().unwrap_or(COINGECKO_API);
        let source = HttpPriceSource::with_base_url(
            base_url,
            prices.coingecko.clone(),
            prices.scale,
            Duration::from_secs(prices.request_timeout_secs),
        )
        .context("Failed to build price client")?;
        return Ok(Arc::new(source));
    }
    info!("Static quotes for {} tokens", prices.fixed.len());
    Ok(Arc::new(StaticPriceSource::with_prices(prices.fixed.clone())))
}

fn build_controllers(
    config: &NodeConfig,
    gateway: Arc<dyn ChainGateway>,
    cache: Arc<dyn CacheStore>,
    metrics: &ControllerMetrics,
) -> Result<HashMap<AccountKind, Arc<Controller>>> {
    let mut controllers = HashMap::new();
    for controller_config in config.controllers() {
        let kind = controller_config.kind;
        let mut builder = Controller::builder(controller_config, gateway.clone(), cache.clone()).metrics(metrics.clone());
        if kind == AccountKind::PriceTrade {
            builder = builder.price_source(price_source(&config.prices)?);
        }
        let controller = builder
            .build()
            .with_context(|| format!("Invalid {} controller configuration", kind))?;
        controllers.insert(kind, Arc::new(controller));
    }
    if controllers.is_empty() {
        bail!("No controllers configured; add a protection, dca or price_trade section");
    }
    Ok(controllers)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    info!("Starting Vigil node...");
    let config = NodeConfig::load(&args.config)?;

    // Keys
    let signer = match &config.keypair_path {
        Some(path) => {
            let keypair = Keypair::read_from_file(path)
                .with_context(|| format!("Failed to load keypair {}", path.display()))?;
            info!("Authority {}", keypair.pubkey());
            Some(Arc::new(keypair))
        }
        None => None,
    };

    // Chain client and cache
    let gateway: Arc<dyn ChainGateway> =
        Arc::new(RpcGateway::new(config.rpc(), signer).context("Failed to build RPC client")?);
    info!("RPC endpoint {} ({:?})", config.rpc_url, config.commitment);
    let cache = open_cache(&config, &args.data_dir)?;

    // Controllers
    let metrics = ControllerMetrics::new();
    let mut registry = Registry::default();
    metrics.register(&mut registry);
    let controllers = build_controllers(&config, gateway, cache, &metrics)?;
    for controller in controllers.values() {
        controller.start().await;
    }

    // API
    let api_state = AppState::new(controllers.clone(), registry);
    let api_addr = config.api_listen;
    let api = tokio::spawn(async move {
        if let Err(e) = vigil_api::start_server(api_addr, api_state).await {
            error!("API server failed: {}", e);
        }
    });

    info!("Node running. Press Ctrl+C to stop.");
    signal::ctrl_c().await?;

    info!("Shutting down...");
    api.abort();
    for controller in controllers.values() {
        controller.stop().await;
    }
    Ok(())
}

#[cfg(test)]
mod tests;

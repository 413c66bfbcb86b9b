use crate::error::PriceError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;
use vigil_types::Pubkey;

/// Market quote for a token, in the same units as the on-chain target price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, token: &Pubkey) -> Result<f64, PriceError>;
}

/// In-memory quote table. Quotes can be replaced while controllers run.
#[derive(Default)]
pub struct StaticPriceSource {
    prices: RwLock<HashMap<Pubkey, f64>>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(prices: impl IntoIterator<Item = (Pubkey, f64)>) -> Self {
        Self {
            prices: RwLock::new(prices.into_iter().collect()),
        }
    }

    pub fn set_price(&self, token: Pubkey, price: f64) {
        if let Ok(mut guard) = self.prices.write() {
            guard.insert(token, price);
        }
    }

    pub fn remove_price(&self, token: &Pubkey) {
        if let Ok(mut guard) = self.prices.write() {
            guard.remove(token);
        }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn current_price(&self, token: &Pubkey) -> Result<f64, PriceError> {
        self.prices
            .read()
            .ok()
            .and_then(|guard| guard.get(token).copied())
            .ok_or(PriceError::NoPriceAvailable(*token))
    }
}

pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";
pub const PRICE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinGecko `simple/price` lookups for a fixed token → coin id map.
///
/// Quotes are USD and get multiplied by `scale` so they compare directly
/// against integer on-chain prices.
pub struct HttpPriceSource {
    client: Client,
    base_url: String,
    coin_ids: HashMap<Pubkey, String>,
    scale: f64,
}

impl HttpPriceSource {
    pub fn new(coin_ids: HashMap<Pubkey, String>, scale: f64) -> Result<Self, PriceError> {
        Self::with_base_url(COINGECKO_API, coin_ids, scale, PRICE_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        coin_ids: HashMap<Pubkey, String>,
        scale: f64,
        timeout: Duration,
    ) -> Result<Self, PriceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            coin_ids,
            scale,
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn current_price(&self, token: &Pubkey) -> Result<f64, PriceError> {
        let id = self.coin_ids.get(token).ok_or(PriceError::NoPriceAvailable(*token))?;
        let url = format!("{}/simple/price?ids={}&vs_currencies=usd", self.base_url, id);
        let resp: Value = self.client.get(&url).send().await?.error_for_status()?.json().await?;
        let usd = resp[id.as_str()]["usd"]
            .as_f64()
            .ok_or(PriceError::NoPriceAvailable(*token))?;
        debug!("Quote for {} ({}): {} USD", token, id, usd);
        Ok(usd * self.scale)
    }
}

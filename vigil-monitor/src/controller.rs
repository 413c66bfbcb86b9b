use crate::config::ControllerConfig;
use crate::error::{CheckError, ConfigError};
use crate::metrics::ControllerMetrics;
use crate::registry::MonitorRegistry;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use vigil_codec::build_instruction;
use vigil_codec::layout::decode_protection;
use vigil_evaluator::{evaluate_dca, evaluate_price_trade, evaluate_protection};
use vigil_gateway::{ChainGateway, GatewayError, PriceSource};
use vigil_storage::CacheStore;
use vigil_types::{AccountKind, AccountState, CacheSnapshot, MonitoredAccount, ProtectionState, Pubkey};

/// Wall clock in unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

struct CheckOutcome {
    state: AccountState,
    // None when the evaluator chose no action.
    submission: Option<Result<String, GatewayError>>,
}

#[derive(Default)]
struct CycleSummary {
    checked: usize,
    triggered: usize,
    failed: usize,
}

struct Inner {
    config: ControllerConfig,
    authority: Pubkey,
    gateway: Arc<dyn ChainGateway>,
    cache: Arc<dyn CacheStore>,
    prices: Option<Arc<dyn PriceSource>>,
    clock: Arc<dyn Clock>,
    metrics: ControllerMetrics,
    registry: RwLock<MonitorRegistry>,
    // Held for the whole of a cycle; serializes ticks and forced checks.
    cycle: Mutex<()>,
    running: AtomicBool,
}

struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Watches every registered account of one kind and fires its automation
/// instruction when the account's trigger condition holds.
pub struct Controller {
    inner: Arc<Inner>,
    task: Mutex<Option<RunningTask>>,
}

pub struct ControllerBuilder {
    config: ControllerConfig,
    gateway: Arc<dyn ChainGateway>,
    cache: Arc<dyn CacheStore>,
    prices: Option<Arc<dyn PriceSource>>,
    clock: Arc<dyn Clock>,
    metrics: ControllerMetrics,
}

impl ControllerBuilder {
    pub fn price_source(mut self, prices: Arc<dyn PriceSource>) -> Self {
        self.prices = Some(prices);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(mut self, metrics: ControllerMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> Result<Controller, ConfigError> {
        self.config.validate()?;
        let authority = self.gateway.authority().ok_or(ConfigError::MissingSigner)?;
        if self.config.kind == AccountKind::PriceTrade && self.prices.is_none() {
            return Err(ConfigError::MissingPriceSource);
        }

        let mut registry = MonitorRegistry::new(self.config.kind);
        for address in self.config.accounts.iter().flatten() {
            registry.add(*address);
        }

        Ok(Controller {
            inner: Arc::new(Inner {
                config: self.config,
                authority,
                gateway: self.gateway,
                cache: self.cache,
                prices: self.prices,
                clock: self.clock,
                metrics: self.metrics,
                registry: RwLock::new(registry),
                cycle: Mutex::new(()),
                running: AtomicBool::new(false),
            }),
            task: Mutex::new(None),
        })
    }
}

impl Controller {
    pub fn builder(config: ControllerConfig, gateway: Arc<dyn ChainGateway>, cache: Arc<dyn CacheStore>) -> ControllerBuilder {
        ControllerBuilder {
            config,
            gateway,
            cache,
            prices: None,
            clock: Arc::new(SystemClock),
            metrics: ControllerMetrics::default(),
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.inner.config.kind
    }

    /// Loads the cache, arms the ticker and runs the first cycle at once.
    /// Starting a running controller does nothing.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            warn!("{} monitoring already running", self.kind());
            return;
        }

        self.inner.load_cache().await;

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(inner.config.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        inner.run_cycle().await;
                    }
                }
            }
            debug!("{} ticker exited", inner.config.kind);
        });

        self.inner.running.store(true, Ordering::SeqCst);
        *task = Some(RunningTask { shutdown, handle });
        info!(
            "Started {} monitoring of {} accounts every {:?}",
            self.kind(),
            self.inner.registry.read().await.len(),
            self.inner.config.tick_interval
        );
    }

    /// Stops the ticker. A cycle already in progress runs to completion
    /// before this returns.
    pub async fn stop(&self) {
        let Some(task) = self.task.lock().await.take() else {
            debug!("{} monitoring not running", self.kind());
            return;
        };
        self.inner.running.store(false, Ordering::SeqCst);
        let _ = task.shutdown.send(true);
        if let Err(e) = task.handle.await {
            error!("{} ticker task failed: {}", self.kind(), e);
        }
        info!("Stopped {} monitoring", self.kind());
    }

    pub fn is_currently_monitoring(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Takes effect from the next cycle.
    pub async fn add_account_to_monitor(&self, address: Pubkey) -> bool {
        let added = self.inner.registry.write().await.add(address);
        if added {
            info!("Monitoring {} account {}", self.kind(), address);
        }
        added
    }

    pub async fn remove_account_from_monitor(&self, address: &Pubkey) -> bool {
        let removed = self.inner.registry.write().await.remove(address);
        if removed {
            info!("No longer monitoring {} account {}", self.kind(), address);
        }
        removed
    }

    pub async fn get_monitored_accounts(&self) -> Vec<Pubkey> {
        self.inner.registry.read().await.list()
    }

    pub async fn get_account_status(&self, address: &Pubkey) -> Option<CacheSnapshot> {
        self.inner.registry.read().await.snapshot(address)
    }

    /// Runs a cycle now. If one is in flight, waits for it to finish first.
    pub async fn force_check(&self) -> Vec<CacheSnapshot> {
        self.inner.run_cycle().await
    }
}

impl Inner {
    async fn load_cache(&self) {
        match self.cache.get(&self.config.cache_key).await {
            Ok(Some(snapshots)) => {
                let added = self.registry.write().await.load_from_cache(&snapshots);
                info!("Restored {} {} accounts from cache", added, self.config.kind);
            }
            Ok(None) => debug!("No cached {} accounts", self.config.kind),
            Err(e) => warn!("Failed to read {} cache: {}", self.config.kind, e),
        }
    }

    async fn run_cycle(&self) -> Vec<CacheSnapshot> {
        let _cycle = self.cycle.lock().await;
        let kind = self.config.kind;
        let now = self.clock.now_millis();
        let targets = self.registry.read().await.accounts();

        let results: Vec<(Pubkey, u64, Result<CheckOutcome, CheckError>)> = stream::iter(targets)
            .map(|(account, generation)| async move {
                let result = self.check_account(&account, now).await;
                (account.address, generation, result)
            })
            .buffered(self.config.max_concurrency)
            .collect()
            .await;

        let mut summary = CycleSummary::default();
        let batch = {
            let mut registry = self.registry.write().await;
            for (address, generation, result) in results {
                match result {
                    Ok(outcome) => {
                        summary.checked += 1;
                        self.metrics.record_check(kind);
                        let triggered = match outcome.submission {
                            Some(Ok(_)) => {
                                summary.triggered += 1;
                                self.metrics.record_trigger(kind);
                                true
                            }
                            Some(Err(e)) => {
                                let e = CheckError::Submission(e);
                                summary.failed += 1;
                                self.metrics.record_failure(kind, e.label());
                                warn!("{} check failed for {}: {}", kind, address, e);
                                false
                            }
                            None => false,
                        };
                        if !registry.record_check(&address, generation, now, outcome.state, triggered) {
                            debug!("{} was removed during the cycle; dropping its result", address);
                        }
                    }
                    Err(e) => {
                        summary.failed += 1;
                        self.metrics.record_failure(kind, e.label());
                        warn!("{} check failed for {}: {}", kind, address, e);
                    }
                }
            }
            registry.snapshots()
        };

        if let Err(e) = self.cache.set(&self.config.cache_key, &batch).await {
            error!("Failed to persist {} snapshots: {}", kind, e);
        }
        self.metrics.record_cycle(kind);
        info!(
            "{} cycle: checked {}, triggered {}, failed {}",
            kind, summary.checked, summary.triggered, summary.failed
        );
        batch
    }

    async fn check_account(&self, account: &MonitoredAccount, now: u64) -> Result<CheckOutcome, CheckError> {
        let bytes = self.gateway.get_account_bytes(&account.address).await?;
        let state = vigil_codec::decode(self.config.kind, &bytes)?;

        let decision = match state {
            AccountState::Protection(s) => evaluate_protection(&s, now),
            AccountState::Dca(s) => evaluate_dca(&s, account.last_triggered_at, now),
            AccountState::PriceTrade(s) => {
                let Some(prices) = self.prices.as_ref() else {
                    // The builder refuses price trade controllers without a source.
                    return Ok(CheckOutcome { state, submission: None });
                };
                let price = prices.current_price(&s.token_address).await?;
                debug!("{} price for {} is {} (target {})", account.address, s.token_address, price, s.target_price);
                evaluate_price_trade(&s, price)
            }
        };

        let Some(action) = decision.action else {
            return Ok(CheckOutcome { state, submission: None });
        };

        let ix = build_instruction(
            &self.config.discriminators,
            self.config.program_id,
            account.address,
            self.authority,
            &action,
        );
        let signature = match self.gateway.submit_instruction(&ix).await {
            Ok(signature) => signature,
            // The account was still read and evaluated; the caller records that.
            Err(e) => return Ok(CheckOutcome { state, submission: Some(Err(e)) }),
        };
        info!("{} fired {} for {}: {}", self.config.kind, action.name(), account.address, signature);

        let state = match state {
            AccountState::Protection(before) => match self.reread_protection(&account.address).await {
                Ok(after) => {
                    info!(
                        "{} health factor {} -> {}",
                        account.address, before.health_factor, after.health_factor
                    );
                    AccountState::Protection(after)
                }
                Err(e) => {
                    warn!("Could not re-read {} after repay: {}", account.address, e);
                    state
                }
            },
            other => other,
        };

        Ok(CheckOutcome {
            state,
            submission: Some(Ok(signature)),
        })
    }

    async fn reread_protection(&self, address: &Pubkey) -> Result<ProtectionState, CheckError> {
        let bytes = self.gateway.get_account_bytes(address).await?;
        Ok(decode_protection(&bytes)?)
    }
}

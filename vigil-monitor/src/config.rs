use crate::error::ConfigError;
use std::time::Duration;
use vigil_codec::DiscriminatorTable;
use vigil_types::{AccountKind, Pubkey};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub kind: AccountKind,
    /// The automation program every instruction is addressed to.
    pub program_id: Pubkey,
    /// Accounts to watch from the start. `None` means the deployment never
    /// configured a list, which is an error; an empty list is fine.
    pub accounts: Option<Vec<Pubkey>>,
    pub tick_interval: Duration,
    pub cache_key: String,
    pub max_concurrency: usize,
    pub discriminators: DiscriminatorTable,
}

impl ControllerConfig {
    pub fn new(kind: AccountKind, program_id: Pubkey) -> Self {
        Self {
            kind,
            program_id,
            accounts: Some(Vec::new()),
            tick_interval: DEFAULT_TICK_INTERVAL,
            cache_key: default_cache_key(kind),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            discriminators: DiscriminatorTable::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.is_none() {
            return Err(ConfigError::MissingAccounts(self.kind));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.cache_key.trim().is_empty() {
            return Err(ConfigError::EmptyCacheKey);
        }
        Ok(())
    }
}

pub fn default_cache_key(kind: AccountKind) -> String {
    format!("automation_{}", kind)
}

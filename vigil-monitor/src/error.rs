use thiserror::Error;
use vigil_codec::DecodeError;
use vigil_gateway::{GatewayError, PriceError};
use vigil_types::AccountKind;

/// Raised while building a controller; the controller never starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no signing key configured")]
    MissingSigner,
    #[error("price trade monitoring needs a price source")]
    MissingPriceSource,
    #[error("no account list configured for {0} monitoring")]
    MissingAccounts(AccountKind),
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("cache key must not be empty")]
    EmptyCacheKey,
}

/// A failure confined to one account within one cycle.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] GatewayError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("price lookup failed: {0}")]
    Price(#[from] PriceError),
    #[error("submission failed: {0}")]
    Submission(GatewayError),
}

impl CheckError {
    pub fn label(&self) -> &'static str {
        match self {
            CheckError::Fetch(GatewayError::AccountNotFound(_)) => "not_found",
            CheckError::Fetch(_) => "fetch",
            CheckError::Decode(_) => "decode",
            CheckError::Price(_) => "price",
            CheckError::Submission(_) => "submission",
        }
    }
}

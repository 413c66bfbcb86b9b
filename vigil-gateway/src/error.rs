use thiserror::Error;
use vigil_types::Pubkey;

use crate::message::MessageError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("account {0} not found")]
    AccountNotFound(Pubkey),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
    #[error("no signing key configured")]
    MissingSigner,
    #[error("transaction {signature} failed: {reason}")]
    Submission { signature: String, reason: String },
    #[error("transaction {0} not confirmed before timeout")]
    Timeout(String),
    #[error(transparent)]
    Message(#[from] MessageError),
}

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("no price available for token {0}")]
    NoPriceAvailable(Pubkey),
    #[error("price http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("keypair io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("keypair file is not a JSON byte array: {0}")]
    Format(#[from] serde_json::Error),
    #[error("keypair must be 64 bytes, got {0}")]
    Length(usize),
    #[error("invalid keypair: {0}")]
    Invalid(String),
    #[error("signature verification failed")]
    BadSignature,
}

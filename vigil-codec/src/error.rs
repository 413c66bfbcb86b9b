use thiserror::Error;
use vigil_types::AccountKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{kind} account data too short: need {needed} bytes, got {actual}")]
    TooShort {
        kind: AccountKind,
        needed: usize,
        actual: usize,
    },
}

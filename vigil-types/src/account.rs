use crate::pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which automation a monitored account carries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Protection,
    Dca,
    PriceTrade,
}

impl AccountKind {
    pub const ALL: [AccountKind; 3] = [AccountKind::Protection, AccountKind::Dca, AccountKind::PriceTrade];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Protection => "protection",
            AccountKind::Dca => "dca",
            AccountKind::PriceTrade => "price_trade",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown account kind `{0}` (expected protection, dca or price_trade)")]
pub struct ParseKindError(pub String);

impl FromStr for AccountKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "protection" => Ok(AccountKind::Protection),
            "dca" => Ok(AccountKind::Dca),
            "price_trade" | "pricetrade" | "price" => Ok(AccountKind::PriceTrade),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

/// Lending position protection settings plus the live health factor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionState {
    pub health_factor: u64,
    pub trigger_health_factor: u64,
    pub target_health_factor: u64,
    pub automation_enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DcaState {
    pub interval_seconds: u64,
    pub token_address: Pubkey,
    pub token_amount: u64,
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PriceTradeState {
    pub target_price: u64,
    pub token_address: Pubkey,
    pub token_amount: u64,
    pub enabled: bool,
}

/// A decoded account of any kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Protection(ProtectionState),
    Dca(DcaState),
    PriceTrade(PriceTradeState),
}

impl AccountState {
    pub fn kind(&self) -> AccountKind {
        match self {
            AccountState::Protection(_) => AccountKind::Protection,
            AccountState::Dca(_) => AccountKind::Dca,
            AccountState::PriceTrade(_) => AccountKind::PriceTrade,
        }
    }
}

/// An address under watch and its check/trigger timing (unix millis).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredAccount {
    pub address: Pubkey,
    pub kind: AccountKind,
    /// Zero until the first successful check.
    pub last_checked_at: u64,
    pub last_triggered_at: Option<u64>,
}

impl MonitoredAccount {
    pub fn new(address: Pubkey, kind: AccountKind) -> Self {
        Self {
            address,
            kind,
            last_checked_at: 0,
            last_triggered_at: None,
        }
    }
}

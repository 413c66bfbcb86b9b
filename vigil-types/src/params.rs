//! Setup parameters for each automation, validated once at construction.
//!
//! Deserialization runs the same checks, so a value of these types is always
//! well-formed downstream.

use crate::instruction::InstructionData;
use crate::pubkey::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("target health factor {target} must exceed trigger health factor {trigger}")]
    TargetNotAboveTrigger { trigger: u64, target: u64 },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct RawProtectionParams {
    trigger_health_factor: u64,
    target_health_factor: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawProtectionParams", into = "RawProtectionParams")]
pub struct ProtectionParams {
    trigger_health_factor: u64,
    target_health_factor: u64,
}

impl ProtectionParams {
    pub fn new(trigger_health_factor: u64, target_health_factor: u64) -> Result<Self, ParamsError> {
        if trigger_health_factor == 0 {
            return Err(ParamsError::Zero("trigger health factor"));
        }
        if target_health_factor <= trigger_health_factor {
            return Err(ParamsError::TargetNotAboveTrigger {
                trigger: trigger_health_factor,
                target: target_health_factor,
            });
        }
        Ok(Self { trigger_health_factor, target_health_factor })
    }

    pub fn trigger_health_factor(&self) -> u64 {
        self.trigger_health_factor
    }

    pub fn target_health_factor(&self) -> u64 {
        self.target_health_factor
    }

    pub fn instruction(&self) -> InstructionData {
        InstructionData::SetAutomation {
            trigger_health_factor: self.trigger_health_factor,
            target_health_factor: self.target_health_factor,
        }
    }
}

impl TryFrom<RawProtectionParams> for ProtectionParams {
    type Error = ParamsError;

    fn try_from(raw: RawProtectionParams) -> Result<Self, Self::Error> {
        Self::new(raw.trigger_health_factor, raw.target_health_factor)
    }
}

impl From<ProtectionParams> for RawProtectionParams {
    fn from(p: ProtectionParams) -> Self {
        Self {
            trigger_health_factor: p.trigger_health_factor,
            target_health_factor: p.target_health_factor,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct RawDcaParams {
    interval_seconds: u64,
    token_address: Pubkey,
    token_amount: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawDcaParams", into = "RawDcaParams")]
pub struct DcaParams {
    interval_seconds: u64,
    token_address: Pubkey,
    token_amount: u64,
}

impl DcaParams {
    pub fn new(interval_seconds: u64, token_address: Pubkey, token_amount: u64) -> Result<Self, ParamsError> {
        if interval_seconds == 0 {
            return Err(ParamsError::Zero("interval"));
        }
        if token_amount == 0 {
            return Err(ParamsError::Zero("token amount"));
        }
        Ok(Self { interval_seconds, token_address, token_amount })
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    pub fn token_address(&self) -> Pubkey {
        self.token_address
    }

    pub fn token_amount(&self) -> u64 {
        self.token_amount
    }

    pub fn instruction(&self) -> InstructionData {
        InstructionData::SetDca {
            interval_seconds: self.interval_seconds,
            token_address: self.token_address,
            token_amount: self.token_amount,
        }
    }
}

impl TryFrom<RawDcaParams> for DcaParams {
    type Error = ParamsError;

    fn try_from(raw: RawDcaParams) -> Result<Self, Self::Error> {
        Self::new(raw.interval_seconds, raw.token_address, raw.token_amount)
    }
}

impl From<DcaParams> for RawDcaParams {
    fn from(p: DcaParams) -> Self {
        Self {
            interval_seconds: p.interval_seconds,
            token_address: p.token_address,
            token_amount: p.token_amount,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct RawPriceTradeParams {
    target_price: u64,
    token_address: Pubkey,
    token_amount: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawPriceTradeParams", into = "RawPriceTradeParams")]
pub struct PriceTradeParams {
    target_price: u64,
    token_address: Pubkey,
    token_amount: u64,
}

impl PriceTradeParams {
    pub fn new(target_price: u64, token_address: Pubkey, token_amount: u64) -> Result<Self, ParamsError> {
        if target_price == 0 {
            return Err(ParamsError::Zero("target price"));
        }
        if token_amount == 0 {
            return Err(ParamsError::Zero("token amount"));
        }
        Ok(Self { target_price, token_address, token_amount })
    }

    pub fn target_price(&self) -> u64 {
        self.target_price
    }

    pub fn token_address(&self) -> Pubkey {
        self.token_address
    }

    pub fn token_amount(&self) -> u64 {
        self.token_amount
    }

    pub fn instruction(&self) -> InstructionData {
        InstructionData::SetPriceTrading {
            target_price: self.target_price,
            token_address: self.token_address,
            token_amount: self.token_amount,
        }
    }
}

impl TryFrom<RawPriceTradeParams> for PriceTradeParams {
    type Error = ParamsError;

    fn try_from(raw: RawPriceTradeParams) -> Result<Self, Self::Error> {
        Self::new(raw.target_price, raw.token_address, raw.token_amount)
    }
}

impl From<PriceTradeParams> for RawPriceTradeParams {
    fn from(p: PriceTradeParams) -> Self {
        Self {
            target_price: p.target_price,
            token_address: p.token_address,
            token_amount: p.token_amount,
        }
    }
}

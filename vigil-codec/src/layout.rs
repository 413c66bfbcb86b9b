//! Fixed-offset account layouts shared with the automation program.
//!
//! All integers are little-endian u64, booleans are a single byte where any
//! nonzero value is `true`, and public keys are their raw 32 bytes. The first
//! eight bytes of every account are an opaque header and are never read.

use crate::error::DecodeError;
use vigil_types::pubkey::PUBKEY_BYTES;
use vigil_types::{AccountKind, AccountState, DcaState, PriceTradeState, ProtectionState, Pubkey};

pub const HEADER_LEN: usize = 8;

pub mod protection {
    pub const HEALTH_FACTOR: usize = 8;
    pub const TRIGGER_HEALTH_FACTOR: usize = 16;
    pub const TARGET_HEALTH_FACTOR: usize = 24;
    pub const AUTOMATION_ENABLED: usize = 32;
    pub const MIN_LEN: usize = AUTOMATION_ENABLED + 1;
}

pub mod dca {
    pub const INTERVAL_SECONDS: usize = 40;
    pub const TOKEN_ADDRESS: usize = 48;
    pub const TOKEN_AMOUNT: usize = 80;
    pub const ENABLED: usize = 88;
    pub const MIN_LEN: usize = ENABLED + 1;
}

pub mod price_trade {
    pub const TARGET_PRICE: usize = 89;
    pub const TOKEN_ADDRESS: usize = 97;
    pub const TOKEN_AMOUNT: usize = 129;
    pub const ENABLED: usize = 137;
    pub const MIN_LEN: usize = ENABLED + 1;
}

/// Smallest buffer that holds every field of `kind`.
pub fn min_len(kind: AccountKind) -> usize {
    match kind {
        AccountKind::Protection => protection::MIN_LEN,
        AccountKind::Dca => dca::MIN_LEN,
        AccountKind::PriceTrade => price_trade::MIN_LEN,
    }
}

fn ensure_len(kind: AccountKind, data: &[u8]) -> Result<(), DecodeError> {
    let needed = min_len(kind);
    if data.len() < needed {
        return Err(DecodeError::TooShort {
            kind,
            needed,
            actual: data.len(),
        });
    }
    Ok(())
}

// Callers check the length first; these only slice in-bounds ranges.
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut buf = [0u8; PUBKEY_BYTES];
    buf.copy_from_slice(&data[offset..offset + PUBKEY_BYTES]);
    Pubkey::new(buf)
}

fn read_bool(data: &[u8], offset: usize) -> bool {
    data[offset] != 0
}

pub fn decode_protection(data: &[u8]) -> Result<ProtectionState, DecodeError> {
    ensure_len(AccountKind::Protection, data)?;
    Ok(ProtectionState {
        health_factor: read_u64(data, protection::HEALTH_FACTOR),
        trigger_health_factor: read_u64(data, protection::TRIGGER_HEALTH_FACTOR),
        target_health_factor: read_u64(data, protection::TARGET_HEALTH_FACTOR),
        automation_enabled: read_bool(data, protection::AUTOMATION_ENABLED),
    })
}

pub fn decode_dca(data: &[u8]) -> Result<DcaState, DecodeError> {
    ensure_len(AccountKind::Dca, data)?;
    Ok(DcaState {
        interval_seconds: read_u64(data, dca::INTERVAL_SECONDS),
        token_address: read_pubkey(data, dca::TOKEN_ADDRESS),
        token_amount: read_u64(data, dca::TOKEN_AMOUNT),
        enabled: read_bool(data, dca::ENABLED),
    })
}

pub fn decode_price_trade(data: &[u8]) -> Result<PriceTradeState, DecodeError> {
    ensure_len(AccountKind::PriceTrade, data)?;
    Ok(PriceTradeState {
        target_price: read_u64(data, price_trade::TARGET_PRICE),
        token_address: read_pubkey(data, price_trade::TOKEN_ADDRESS),
        token_amount: read_u64(data, price_trade::TOKEN_AMOUNT),
        enabled: read_bool(data, price_trade::ENABLED),
    })
}

pub fn decode(kind: AccountKind, data: &[u8]) -> Result<AccountState, DecodeError> {
    match kind {
        AccountKind::Protection => decode_protection(data).map(AccountState::Protection),
        AccountKind::Dca => decode_dca(data).map(AccountState::Dca),
        AccountKind::PriceTrade => decode_price_trade(data).map(AccountState::PriceTrade),
    }
}

fn grow(buf: &mut Vec<u8>, kind: AccountKind) {
    let needed = min_len(kind);
    if buf.len() < needed {
        buf.resize(needed, 0);
    }
}

fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn write_pubkey(buf: &mut [u8], offset: usize, key: &Pubkey) {
    buf[offset..offset + PUBKEY_BYTES].copy_from_slice(key.as_bytes());
}

/// Writes the modeled fields into `buf`, zero-extending it if needed.
/// Bytes outside the field ranges (the header included) are left alone.
pub fn encode_protection(state: &ProtectionState, buf: &mut Vec<u8>) {
    grow(buf, AccountKind::Protection);
    write_u64(buf, protection::HEALTH_FACTOR, state.health_factor);
    write_u64(buf, protection::TRIGGER_HEALTH_FACTOR, state.trigger_health_factor);
    write_u64(buf, protection::TARGET_HEALTH_FACTOR, state.target_health_factor);
    buf[protection::AUTOMATION_ENABLED] = state.automation_enabled as u8;
}

pub fn encode_dca(state: &DcaState, buf: &mut Vec<u8>) {
    grow(buf, AccountKind::Dca);
    write_u64(buf, dca::INTERVAL_SECONDS, state.interval_seconds);
    write_pubkey(buf, dca::TOKEN_ADDRESS, &state.token_address);
    write_u64(buf, dca::TOKEN_AMOUNT, state.token_amount);
    buf[dca::ENABLED] = state.enabled as u8;
}

pub fn encode_price_trade(state: &PriceTradeState, buf: &mut Vec<u8>) {
    grow(buf, AccountKind::PriceTrade);
    write_u64(buf, price_trade::TARGET_PRICE, state.target_price);
    write_pubkey(buf, price_trade::TOKEN_ADDRESS, &state.token_address);
    write_u64(buf, price_trade::TOKEN_AMOUNT, state.token_amount);
    buf[price_trade::ENABLED] = state.enabled as u8;
}

pub fn encode(state: &AccountState, buf: &mut Vec<u8>) {
    match state {
        AccountState::Protection(s) => encode_protection(s, buf),
        AccountState::Dca(s) => encode_dca(s, buf),
        AccountState::PriceTrade(s) => encode_price_trade(s, buf),
    }
}

use crate::account::{AccountKind, AccountState, MonitoredAccount};
use crate::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

/// Persisted projection of a monitored account and its last decoded state.
///
/// `state` is `None` until the account has been read successfully once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub account_address: String,
    pub kind: AccountKind,
    pub state: Option<AccountState>,
    pub last_checked: u64,
    pub last_triggered: Option<u64>,
}

impl CacheSnapshot {
    pub fn pending(address: Pubkey, kind: AccountKind) -> Self {
        Self {
            account_address: address.to_string(),
            kind,
            state: None,
            last_checked: 0,
            last_triggered: None,
        }
    }

    pub fn from_account(account: &MonitoredAccount, state: Option<AccountState>) -> Self {
        Self {
            account_address: account.address.to_string(),
            kind: account.kind,
            state,
            last_checked: account.last_checked_at,
            last_triggered: account.last_triggered_at,
        }
    }

    pub fn address(&self) -> Option<Pubkey> {
        self.account_address.parse().ok()
    }

    /// Rebuilds the registry entry this snapshot was taken from.
    pub fn to_monitored(&self) -> Option<MonitoredAccount> {
        Some(MonitoredAccount {
            address: self.address()?,
            kind: self.kind,
            last_checked_at: self.last_checked,
            last_triggered_at: self.last_triggered,
        })
    }
}

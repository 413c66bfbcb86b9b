use std::collections::HashMap;
use tracing::{debug, warn};
use vigil_types::{AccountKind, AccountState, CacheSnapshot, MonitoredAccount, Pubkey};

struct Entry {
    account: MonitoredAccount,
    state: Option<AccountState>,
    // Distinguishes a re-added address from the registration a cycle started with.
    generation: u64,
}

/// Addresses under watch for one automation kind, in insertion order,
/// with the timing and last decoded state of each.
pub struct MonitorRegistry {
    kind: AccountKind,
    order: Vec<Pubkey>,
    entries: HashMap<Pubkey, Entry>,
    next_generation: u64,
}

impl MonitorRegistry {
    pub fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            order: Vec::new(),
            entries: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Returns false if the address was already registered.
    pub fn add(&mut self, address: Pubkey) -> bool {
        if self.entries.contains_key(&address) {
            return false;
        }
        let generation = self.bump_generation();
        self.order.push(address);
        self.entries.insert(
            address,
            Entry {
                account: MonitoredAccount::new(address, self.kind),
                state: None,
                generation,
            },
        );
        true
    }

    pub fn remove(&mut self, address: &Pubkey) -> bool {
        if self.entries.remove(address).is_none() {
            return false;
        }
        self.order.retain(|a| a != address);
        true
    }

    pub fn list(&self) -> Vec<Pubkey> {
        self.order.clone()
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.entries.contains_key(address)
    }

    pub fn get(&self, address: &Pubkey) -> Option<&MonitoredAccount> {
        self.entries.get(address).map(|e| &e.account)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Copies of every registered account with its registration
    /// generation, in order. Taken at cycle start.
    pub fn accounts(&self) -> Vec<(MonitoredAccount, u64)> {
        self.order
            .iter()
            .filter_map(|a| self.entries.get(a))
            .map(|e| (e.account.clone(), e.generation))
            .collect()
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Merges cached entries at startup. Addresses already registered keep
    /// their live timing; entries of another kind or with unreadable
    /// addresses are skipped. Returns how many addresses were added.
    pub fn load_from_cache(&mut self, snapshots: &[CacheSnapshot]) -> usize {
        let mut added = 0;
        for snap in snapshots {
            if snap.kind != self.kind {
                warn!("Skipping cached {} entry {} in {} registry", snap.kind, snap.account_address, self.kind);
                continue;
            }
            let Some(account) = snap.to_monitored() else {
                warn!("Skipping cached entry with invalid address {}", snap.account_address);
                continue;
            };
            if self.entries.contains_key(&account.address) {
                debug!("Cached entry {} already registered", account.address);
                continue;
            }
            let state = snap.state.filter(|s| s.kind() == self.kind);
            let generation = self.bump_generation();
            self.order.push(account.address);
            self.entries.insert(account.address, Entry { account, state, generation });
            added += 1;
        }
        added
    }

    /// Applies one completed check. Returns false when the address was
    /// removed, or removed and re-added, while the check was in flight; the
    /// result is then dropped.
    pub fn record_check(
        &mut self,
        address: &Pubkey,
        generation: u64,
        checked_at: u64,
        state: AccountState,
        triggered: bool,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(address).filter(|e| e.generation == generation) else {
            return false;
        };
        entry.account.last_checked_at = checked_at;
        if triggered {
            entry.account.last_triggered_at = Some(checked_at);
        }
        entry.state = Some(state);
        true
    }

    pub fn snapshot(&self, address: &Pubkey) -> Option<CacheSnapshot> {
        self.entries
            .get(address)
            .map(|e| CacheSnapshot::from_account(&e.account, e.state))
    }

    /// The full persisted batch, one entry per registered address.
    pub fn snapshots(&self) -> Vec<CacheSnapshot> {
        self.order.iter().filter_map(|a| self.snapshot(a)).collect()
    }
}

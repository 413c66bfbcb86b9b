pub mod account;
pub mod instruction;
pub mod params;
pub mod pubkey;
pub mod snapshot;

pub use account::{AccountKind, AccountState, DcaState, MonitoredAccount, PriceTradeState, ProtectionState};
pub use instruction::{AccountMeta, Instruction, InstructionData};
pub use pubkey::Pubkey;
pub use snapshot::CacheSnapshot;

#[cfg(test)]
mod tests;

use crate::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

/// Every instruction the automation program accepts.
/// Field order is wire order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InstructionData {
    // ══════════════════════════════════════════════════════════════
    // Protection
    // ══════════════════════════════════════════════════════════════
    Initialize,
    SetAutomation { trigger_health_factor: u64, target_health_factor: u64 },
    Borrow { amount: u64 },
    Repay { amount: u64 },
    AutoRepay,

    // ══════════════════════════════════════════════════════════════
    // DCA
    // ══════════════════════════════════════════════════════════════
    SetDca { interval_seconds: u64, token_address: Pubkey, token_amount: u64 },
    MockBuy,

    // ══════════════════════════════════════════════════════════════
    // Price trading
    // ══════════════════════════════════════════════════════════════
    SetPriceTrading { target_price: u64, token_address: Pubkey, token_amount: u64 },
    ExecutePriceTrade,
}

impl InstructionData {
    pub fn name(&self) -> &'static str {
        match self {
            InstructionData::Initialize => "initialize",
            InstructionData::SetAutomation { .. } => "set_automation",
            InstructionData::Borrow { .. } => "borrow",
            InstructionData::Repay { .. } => "repay",
            InstructionData::AutoRepay => "auto_repay",
            InstructionData::SetDca { .. } => "set_dca",
            InstructionData::MockBuy => "mock_buy",
            InstructionData::SetPriceTrading { .. } => "set_price_trading",
            InstructionData::ExecutePriceTrade => "execute_price_trade",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: true }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: false }
    }
}

/// A fully encoded instruction, ready for a chain client to sign and send.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

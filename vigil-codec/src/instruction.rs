use serde::{Deserialize, Serialize};
use vigil_types::pubkey::SYSTEM_PROGRAM_ID;
use vigil_types::{AccountMeta, Instruction, InstructionData, Pubkey};

pub type Discriminator = [u8; 8];

/// The 8-byte tag the automation program expects in front of each
/// instruction. Any entry can be overridden from configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DiscriminatorTable {
    pub initialize: Discriminator,
    pub set_automation: Discriminator,
    pub borrow: Discriminator,
    pub repay: Discriminator,
    pub auto_repay: Discriminator,
    pub set_dca: Discriminator,
    pub mock_buy: Discriminator,
    pub set_price_trading: Discriminator,
    pub execute_price_trade: Discriminator,
}

impl Default for DiscriminatorTable {
    fn default() -> Self {
        Self {
            initialize: [175, 175, 109, 31, 13, 152, 155, 237],
            set_automation: [194, 143, 232, 225, 123, 107, 171, 62],
            borrow: [228, 253, 131, 202, 207, 116, 89, 18],
            repay: [234, 103, 67, 82, 208, 234, 219, 166],
            auto_repay: [112, 104, 176, 118, 250, 61, 48, 164],
            set_dca: [172, 242, 146, 117, 37, 24, 70, 253],
            mock_buy: [78, 68, 188, 9, 18, 208, 176, 76],
            set_price_trading: [48, 29, 241, 178, 218, 213, 198, 109],
            execute_price_trade: [140, 5, 125, 49, 146, 182, 250, 97],
        }
    }
}

impl DiscriminatorTable {
    pub fn for_instruction(&self, ix: &InstructionData) -> Discriminator {
        match ix {
            InstructionData::Initialize => self.initialize,
            InstructionData::SetAutomation { .. } => self.set_automation,
            InstructionData::Borrow { .. } => self.borrow,
            InstructionData::Repay { .. } => self.repay,
            InstructionData::AutoRepay => self.auto_repay,
            InstructionData::SetDca { .. } => self.set_dca,
            InstructionData::MockBuy => self.mock_buy,
            InstructionData::SetPriceTrading { .. } => self.set_price_trading,
            InstructionData::ExecutePriceTrade => self.execute_price_trade,
        }
    }
}

/// `discriminator ++ fields`, u64 little-endian, keys as raw bytes.
pub fn encode_instruction_data(table: &DiscriminatorTable, ix: &InstructionData) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + 48);
    out.extend_from_slice(&table.for_instruction(ix));
    match ix {
        InstructionData::Initialize
        | InstructionData::AutoRepay
        | InstructionData::MockBuy
        | InstructionData::ExecutePriceTrade => {}
        InstructionData::SetAutomation { trigger_health_factor, target_health_factor } => {
            out.extend_from_slice(&trigger_health_factor.to_le_bytes());
            out.extend_from_slice(&target_health_factor.to_le_bytes());
        }
        InstructionData::Borrow { amount } | InstructionData::Repay { amount } => {
            out.extend_from_slice(&amount.to_le_bytes());
        }
        InstructionData::SetDca { interval_seconds, token_address, token_amount } => {
            out.extend_from_slice(&interval_seconds.to_le_bytes());
            out.extend_from_slice(token_address.as_bytes());
            out.extend_from_slice(&token_amount.to_le_bytes());
        }
        InstructionData::SetPriceTrading { target_price, token_address, token_amount } => {
            out.extend_from_slice(&target_price.to_le_bytes());
            out.extend_from_slice(token_address.as_bytes());
            out.extend_from_slice(&token_amount.to_le_bytes());
        }
    }
    out
}

/// Accounts passed to the program: the automation record, its authority,
/// and for `initialize` the system program that allocates the record.
pub fn instruction_accounts(ix: &InstructionData, automation: Pubkey, authority: Pubkey) -> Vec<AccountMeta> {
    let mut accounts = vec![
        AccountMeta::writable(automation, false),
        AccountMeta::writable(authority, true),
    ];
    if matches!(ix, InstructionData::Initialize) {
        accounts.push(AccountMeta::readonly(SYSTEM_PROGRAM_ID, false));
    }
    accounts
}

pub fn build_instruction(
    table: &DiscriminatorTable,
    program_id: Pubkey,
    automation: Pubkey,
    authority: Pubkey,
    ix: &InstructionData,
) -> Instruction {
    Instruction {
        program_id,
        accounts: instruction_accounts(ix, automation, authority),
        data: encode_instruction_data(table, ix),
    }
}

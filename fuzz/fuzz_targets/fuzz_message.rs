#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use vigil_codec::{build_instruction, DiscriminatorTable};
use vigil_gateway::message::Message;
use vigil_types::{InstructionData, Pubkey};

#[derive(Arbitrary, Debug)]
struct MessageInput {
    program: [u8; 32],
    automation: [u8; 32],
    authority: [u8; 32],
    blockhash: [u8; 32],
    which: u8,
    a: u64,
    b: u64,
    token: [u8; 32],
}

fn instruction_from(input: &MessageInput) -> InstructionData {
    let token_address = Pubkey::new(input.token);
    match input.which % 9 {
        0 => InstructionData::Initialize,
        1 => InstructionData::SetAutomation { trigger_health_factor: input.a, target_health_factor: input.b },
        2 => InstructionData::Borrow { amount: input.a },
        3 => InstructionData::Repay { amount: input.a },
        4 => InstructionData::AutoRepay,
        5 => InstructionData::SetDca { interval_seconds: input.a, token_address, token_amount: input.b },
        6 => InstructionData::MockBuy,
        7 => InstructionData::SetPriceTrading { target_price: input.a, token_address, token_amount: input.b },
        _ => InstructionData::ExecutePriceTrade,
    }
}

fuzz_target!(|input: MessageInput| {
    let authority = Pubkey::new(input.authority);
    let ix = build_instruction(
        &DiscriminatorTable::default(),
        Pubkey::new(input.program),
        Pubkey::new(input.automation),
        authority,
        &instruction_from(&input),
    );

    let message = Message::compile(authority, &[ix], input.blockhash).unwrap();
    assert_eq!(message.account_keys[0], authority);
    assert_eq!(message.header.num_required_signatures, 1);
    let _ = message.serialize().unwrap();
});

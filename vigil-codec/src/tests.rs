use super::*;
use crate::layout::{decode_dca, decode_price_trade, decode_protection, encode_protection, min_len};
use proptest::prelude::*;
use vigil_types::{AccountKind, AccountState, DcaState, InstructionData, PriceTradeState, ProtectionState, Pubkey};

fn protection_bytes(hf: u64, trigger: u64, target: u64, enabled: u8) -> Vec<u8> {
    let mut data = vec![0xAAu8; 8];
    data.extend_from_slice(&hf.to_le_bytes());
    data.extend_from_slice(&trigger.to_le_bytes());
    data.extend_from_slice(&target.to_le_bytes());
    data.push(enabled);
    data
}

#[test]
fn test_decode_protection_offsets() {
    let data = protection_bytes(60, 70, 90, 1);
    let state = decode_protection(&data).unwrap();
    assert_eq!(
        state,
        ProtectionState {
            health_factor: 60,
            trigger_health_factor: 70,
            target_health_factor: 90,
            automation_enabled: true,
        }
    );

    // Any nonzero flag byte reads as enabled.
    let data = protection_bytes(60, 70, 90, 0x7f);
    assert!(decode_protection(&data).unwrap().automation_enabled);
    let data = protection_bytes(60, 70, 90, 0);
    assert!(!decode_protection(&data).unwrap().automation_enabled);
}

#[test]
fn test_header_bytes_are_ignored() {
    let mut a = protection_bytes(1, 2, 3, 1);
    let b = a.clone();
    a[..8].copy_from_slice(&[0u8; 8]);
    assert_eq!(decode_protection(&a).unwrap(), decode_protection(&b).unwrap());
}

#[test]
fn test_decode_dca_offsets() {
    let token = Pubkey::new([5u8; 32]);
    let mut data = vec![0u8; 40];
    data.extend_from_slice(&86_400u64.to_le_bytes());
    data.extend_from_slice(token.as_bytes());
    data.extend_from_slice(&1_000u64.to_le_bytes());
    data.push(1);
    assert_eq!(data.len(), 89);

    let state = decode_dca(&data).unwrap();
    assert_eq!(state.interval_seconds, 86_400);
    assert_eq!(state.token_address, token);
    assert_eq!(state.token_amount, 1_000);
    assert!(state.enabled);
}

#[test]
fn test_decode_price_trade_offsets() {
    let token = Pubkey::new([9u8; 32]);
    let mut data = vec![0u8; 89];
    data.extend_from_slice(&150u64.to_le_bytes());
    data.extend_from_slice(token.as_bytes());
    data.extend_from_slice(&25u64.to_le_bytes());
    data.push(1);
    assert_eq!(data.len(), 138);

    let state = decode_price_trade(&data).unwrap();
    assert_eq!(state.target_price, 150);
    assert_eq!(state.token_address, token);
    assert_eq!(state.token_amount, 25);
    assert!(state.enabled);
}

#[test]
fn test_short_buffers_fail() {
    for kind in AccountKind::ALL {
        let needed = min_len(kind);
        let data = vec![1u8; needed - 1];
        assert_eq!(
            decode(kind, &data),
            Err(DecodeError::TooShort { kind, needed, actual: needed - 1 })
        );
        assert!(decode(kind, &vec![1u8; needed]).is_ok());
    }
    assert_eq!(min_len(AccountKind::Protection), 33);
    assert_eq!(min_len(AccountKind::Dca), 89);
    assert_eq!(min_len(AccountKind::PriceTrade), 138);
}

#[test]
fn test_shared_record_decodes_every_kind() {
    // One 138-byte record can carry all three field groups side by side.
    let mut buf = Vec::new();
    let protection = ProtectionState {
        health_factor: 120,
        trigger_health_factor: 110,
        target_health_factor: 150,
        automation_enabled: true,
    };
    let dca = DcaState {
        interval_seconds: 3_600,
        token_address: Pubkey::new([1u8; 32]),
        token_amount: 10,
        enabled: true,
    };
    let trade = PriceTradeState {
        target_price: 150,
        token_address: Pubkey::new([2u8; 32]),
        token_amount: 4,
        enabled: false,
    };
    encode(&AccountState::Protection(protection), &mut buf);
    encode(&AccountState::Dca(dca), &mut buf);
    encode(&AccountState::PriceTrade(trade), &mut buf);

    assert_eq!(buf.len(), 138);
    assert_eq!(decode(AccountKind::Protection, &buf).unwrap(), AccountState::Protection(protection));
    assert_eq!(decode(AccountKind::Dca, &buf).unwrap(), AccountState::Dca(dca));
    assert_eq!(decode(AccountKind::PriceTrade, &buf).unwrap(), AccountState::PriceTrade(trade));
}

#[test]
fn test_instruction_payload_layout() {
    let table = DiscriminatorTable::default();
    let token = Pubkey::new([4u8; 32]);

    let data = encode_instruction_data(&table, &InstructionData::AutoRepay);
    assert_eq!(data, table.auto_repay.to_vec());

    let data = encode_instruction_data(
        &table,
        &InstructionData::SetAutomation { trigger_health_factor: 70, target_health_factor: 90 },
    );
    assert_eq!(data.len(), 24);
    assert_eq!(&data[..8], &table.set_automation);
    assert_eq!(&data[8..16], &70u64.to_le_bytes());
    assert_eq!(&data[16..24], &90u64.to_le_bytes());

    let data = encode_instruction_data(&table, &InstructionData::Repay { amount: 5 });
    assert_eq!(data.len(), 16);

    let data = encode_instruction_data(
        &table,
        &InstructionData::SetDca { interval_seconds: 86_400, token_address: token, token_amount: 7 },
    );
    assert_eq!(data.len(), 56);
    assert_eq!(&data[..8], &table.set_dca);
    assert_eq!(&data[8..16], &86_400u64.to_le_bytes());
    assert_eq!(&data[16..48], token.as_bytes());
    assert_eq!(&data[48..56], &7u64.to_le_bytes());
}

#[test]
fn test_discriminators_are_distinct() {
    let t = DiscriminatorTable::default();
    let all = [
        t.initialize,
        t.set_automation,
        t.borrow,
        t.repay,
        t.auto_repay,
        t.set_dca,
        t.mock_buy,
        t.set_price_trading,
        t.execute_price_trade,
    ];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_discriminator_override_from_config() {
    let table: DiscriminatorTable = serde_json::from_str(r#"{"mock_buy":[1,2,3,4,5,6,7,8]}"#).unwrap();
    assert_eq!(table.mock_buy, [1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(table.auto_repay, DiscriminatorTable::default().auto_repay);
    let data = encode_instruction_data(&table, &InstructionData::MockBuy);
    assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_build_instruction_accounts() {
    let table = DiscriminatorTable::default();
    let program = Pubkey::new([1u8; 32]);
    let automation = Pubkey::new([2u8; 32]);
    let authority = Pubkey::new([3u8; 32]);

    let ix = build_instruction(&table, program, automation, authority, &InstructionData::AutoRepay);
    assert_eq!(ix.program_id, program);
    assert_eq!(ix.accounts.len(), 2);
    assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
    assert!(ix.accounts[1].is_writable && ix.accounts[1].is_signer);

    let ix = build_instruction(&table, program, automation, authority, &InstructionData::Initialize);
    assert_eq!(ix.accounts.len(), 3);
    assert!(!ix.accounts[2].is_writable);
}

proptest! {
    #[test]
    fn prop_protection_round_trip(
        header in any::<[u8; 8]>(),
        hf in any::<u64>(),
        trigger in any::<u64>(),
        target in any::<u64>(),
        enabled in any::<bool>(),
    ) {
        let state = ProtectionState {
            health_factor: hf,
            trigger_health_factor: trigger,
            target_health_factor: target,
            automation_enabled: enabled,
        };
        let mut buf = header.to_vec();
        encode_protection(&state, &mut buf);
        prop_assert_eq!(decode_protection(&buf).unwrap(), state);
        prop_assert_eq!(&buf[..8], &header[..]);
    }

    #[test]
    fn prop_decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..200)) {
        for kind in AccountKind::ALL {
            let result = decode(kind, &data);
            prop_assert_eq!(result.is_ok(), data.len() >= min_len(kind));
        }
    }
}

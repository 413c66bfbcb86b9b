use super::*;
use crate::params::{DcaParams, ParamsError, PriceTradeParams, ProtectionParams};

fn key(byte: u8) -> Pubkey {
    Pubkey::new([byte; 32])
}

#[test]
fn test_pubkey_base58_round_trip() {
    let k = key(7);
    let text = k.to_string();
    assert_eq!(text.parse::<Pubkey>().unwrap(), k);

    // The all-zero key is the system program's well-known address.
    assert_eq!(Pubkey::default().to_string(), "11111111111111111111111111111111");
}

#[test]
fn test_pubkey_rejects_bad_input() {
    assert!(matches!("0OIl".parse::<Pubkey>(), Err(pubkey::ParsePubkeyError::Base58(_))));
    assert_eq!("2".parse::<Pubkey>(), Err(pubkey::ParsePubkeyError::Length(1)));
}

#[test]
fn test_kind_parsing() {
    assert_eq!("protection".parse::<AccountKind>().unwrap(), AccountKind::Protection);
    assert_eq!("DCA".parse::<AccountKind>().unwrap(), AccountKind::Dca);
    assert_eq!("price-trade".parse::<AccountKind>().unwrap(), AccountKind::PriceTrade);
    assert!("lending".parse::<AccountKind>().is_err());
    for kind in AccountKind::ALL {
        assert_eq!(kind.as_str().parse::<AccountKind>().unwrap(), kind);
    }
}

#[test]
fn test_protection_params_validation() {
    assert!(ProtectionParams::new(70, 90).is_ok());
    assert_eq!(ProtectionParams::new(0, 90), Err(ParamsError::Zero("trigger health factor")));
    assert_eq!(
        ProtectionParams::new(90, 90),
        Err(ParamsError::TargetNotAboveTrigger { trigger: 90, target: 90 })
    );
}

#[test]
fn test_params_deserialize_through_validation() {
    let ok: ProtectionParams =
        serde_json::from_str(r#"{"triggerHealthFactor":70,"targetHealthFactor":90}"#).unwrap();
    assert_eq!(ok.trigger_health_factor(), 70);

    let bad = serde_json::from_str::<ProtectionParams>(r#"{"triggerHealthFactor":95,"targetHealthFactor":90}"#);
    assert!(bad.is_err());

    let token = key(3).to_string();
    let dca = format!(r#"{{"intervalSeconds":0,"tokenAddress":"{token}","tokenAmount":5}}"#);
    assert!(serde_json::from_str::<DcaParams>(&dca).is_err());

    let trade = format!(r#"{{"targetPrice":150,"tokenAddress":"{token}","tokenAmount":5}}"#);
    let trade: PriceTradeParams = serde_json::from_str(&trade).unwrap();
    assert_eq!(trade.token_address(), key(3));
    assert_eq!(
        trade.instruction(),
        InstructionData::SetPriceTrading { target_price: 150, token_address: key(3), token_amount: 5 }
    );
}

#[test]
fn test_snapshot_json_shape() {
    let account = MonitoredAccount {
        address: key(1),
        kind: AccountKind::Protection,
        last_checked_at: 1_000,
        last_triggered_at: Some(900),
    };
    let state = AccountState::Protection(ProtectionState {
        health_factor: 60,
        trigger_health_factor: 70,
        target_health_factor: 90,
        automation_enabled: true,
    });
    let snap = CacheSnapshot::from_account(&account, Some(state));
    let json = serde_json::to_value(&snap).unwrap();

    assert_eq!(json["accountAddress"], key(1).to_string());
    assert_eq!(json["lastChecked"], 1_000);
    assert_eq!(json["lastTriggered"], 900);
    assert_eq!(json["state"]["protection"]["healthFactor"], 60);
    assert_eq!(json["state"]["protection"]["automationEnabled"], true);

    let back: CacheSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back.to_monitored().unwrap(), account);
}

#[test]
fn test_pending_snapshot() {
    let snap = CacheSnapshot::pending(key(9), AccountKind::Dca);
    assert_eq!(snap.state, None);
    assert_eq!(snap.last_checked, 0);
    assert_eq!(snap.to_monitored().unwrap(), MonitoredAccount::new(key(9), AccountKind::Dca));
}

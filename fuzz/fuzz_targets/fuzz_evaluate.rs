#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use vigil_evaluator::{evaluate_dca, evaluate_price_trade, evaluate_protection};
use vigil_types::{DcaState, InstructionData, PriceTradeState, ProtectionState, Pubkey};

#[derive(Arbitrary, Debug)]
struct EvalInput {
    health_factor: u64,
    trigger_health_factor: u64,
    target_health_factor: u64,
    enabled: bool,
    interval_seconds: u64,
    last_triggered_at: Option<u64>,
    now: u64,
    target_price: u64,
    current_price: f64,
    token: [u8; 32],
}

fuzz_target!(|data: EvalInput| {
    let protection = ProtectionState {
        health_factor: data.health_factor,
        trigger_health_factor: data.trigger_health_factor,
        target_health_factor: data.target_health_factor,
        automation_enabled: data.enabled,
    };
    let decision = evaluate_protection(&protection, data.now);
    assert_eq!(decision.should_trigger, decision.action.is_some());
    if decision.should_trigger {
        assert_eq!(decision.action, Some(InstructionData::AutoRepay));
        assert!(data.health_factor <= data.trigger_health_factor);
    }

    let dca = DcaState {
        interval_seconds: data.interval_seconds,
        token_address: Pubkey::new(data.token),
        token_amount: 1,
        enabled: data.enabled,
    };
    let decision = evaluate_dca(&dca, data.last_triggered_at, data.now);
    assert_eq!(decision.should_trigger, decision.action.is_some());
    if let (true, Some(last)) = (decision.should_trigger, data.last_triggered_at) {
        assert!(last <= data.now);
    }

    let trade = PriceTradeState {
        target_price: data.target_price,
        token_address: Pubkey::new(data.token),
        token_amount: 1,
        enabled: data.enabled,
    };
    let decision = evaluate_price_trade(&trade, data.current_price);
    assert_eq!(decision.should_trigger, decision.action.is_some());
    if decision.should_trigger {
        assert!(!data.current_price.is_nan());
    }
});

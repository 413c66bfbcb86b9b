use serde::{Deserialize, Serialize};
use vigil_types::{DcaState, InstructionData, PriceTradeState, ProtectionState};

/// Outcome of evaluating one account. `action` is set exactly when
/// `should_trigger` is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerDecision {
    pub should_trigger: bool,
    pub action: Option<InstructionData>,
}

impl TriggerDecision {
    pub fn hold() -> Self {
        Self { should_trigger: false, action: None }
    }

    pub fn fire(action: InstructionData) -> Self {
        Self { should_trigger: true, action: Some(action) }
    }
}

/// Repay when the health factor has fallen to the trigger level.
/// A zero trigger level means automation was never configured.
pub fn evaluate_protection(state: &ProtectionState, _now: u64) -> TriggerDecision {
    if state.automation_enabled
        && state.trigger_health_factor > 0
        && state.health_factor <= state.trigger_health_factor
    {
        TriggerDecision::fire(InstructionData::AutoRepay)
    } else {
        TriggerDecision::hold()
    }
}

/// Buy once per `interval_seconds`. `now` and `last_triggered_at` are unix
/// millis; no previous trigger counts as the interval having elapsed.
pub fn evaluate_dca(state: &DcaState, last_triggered_at: Option<u64>, now: u64) -> TriggerDecision {
    if !state.enabled || state.interval_seconds == 0 {
        return TriggerDecision::hold();
    }
    let due = match last_triggered_at {
        None => true,
        Some(last) if last > now => false,
        Some(last) => now - last >= state.interval_seconds.saturating_mul(1000),
    };
    if due {
        TriggerDecision::fire(InstructionData::MockBuy)
    } else {
        TriggerDecision::hold()
    }
}

/// Buy the dip: fire when the market is at or below the target.
pub fn evaluate_price_trade(state: &PriceTradeState, current_price: f64) -> TriggerDecision {
    // NaN compares false, so an unusable quote never fires.
    if state.enabled && state.target_price > 0 && current_price <= state.target_price as f64 {
        TriggerDecision::fire(InstructionData::ExecutePriceTrade)
    } else {
        TriggerDecision::hold()
    }
}

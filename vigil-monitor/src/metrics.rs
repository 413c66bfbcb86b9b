use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use vigil_types::AccountKind;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct KindLabels {
    pub kind: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    pub kind: String,
    pub reason: String,
}

/// Counters shared by every controller in a process.
#[derive(Clone, Default)]
pub struct ControllerMetrics {
    checks: Family<KindLabels, Counter>,
    triggers: Family<KindLabels, Counter>,
    failures: Family<FailureLabels, Counter>,
    cycles: Family<KindLabels, Counter>,
}

impl ControllerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register("vigil_checks", "Accounts read and evaluated", self.checks.clone());
        registry.register("vigil_triggers", "Confirmed automation transactions", self.triggers.clone());
        registry.register("vigil_check_failures", "Per-account check failures", self.failures.clone());
        registry.register("vigil_cycles", "Completed check cycles", self.cycles.clone());
    }

    fn kind(kind: AccountKind) -> KindLabels {
        KindLabels { kind: kind.to_string() }
    }

    pub fn record_check(&self, kind: AccountKind) {
        self.checks.get_or_create(&Self::kind(kind)).inc();
    }

    pub fn record_trigger(&self, kind: AccountKind) {
        self.triggers.get_or_create(&Self::kind(kind)).inc();
    }

    pub fn record_failure(&self, kind: AccountKind, reason: &str) {
        self.failures
            .get_or_create(&FailureLabels {
                kind: kind.to_string(),
                reason: reason.to_string(),
            })
            .inc();
    }

    pub fn record_cycle(&self, kind: AccountKind) {
        self.cycles.get_or_create(&Self::kind(kind)).inc();
    }

    pub fn checks(&self, kind: AccountKind) -> u64 {
        self.checks.get_or_create(&Self::kind(kind)).get()
    }

    pub fn triggers(&self, kind: AccountKind) -> u64 {
        self.triggers.get_or_create(&Self::kind(kind)).get()
    }

    pub fn failures(&self, kind: AccountKind, reason: &str) -> u64 {
        self.failures
            .get_or_create(&FailureLabels {
                kind: kind.to_string(),
                reason: reason.to_string(),
            })
            .get()
    }
}

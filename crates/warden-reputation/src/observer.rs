// crates/warden-reputation/src/observer.rs
//
// Monitoring side channel for reputation updates.
//
// The decision engine reports named values (belief parameters, online score)
// and named events (disqualification counters) to an injected observer.
// Observers never influence the outcome of an update.

/// Metric names reported by the decision engine.
pub mod metrics {
    pub const AUDIT_ALPHA: &str = "audit_reputation_alpha";
    pub const AUDIT_BETA: &str = "audit_reputation_beta";
    pub const UNKNOWN_AUDIT_ALPHA: &str = "unknown_audit_reputation_alpha";
    pub const UNKNOWN_AUDIT_BETA: &str = "unknown_audit_reputation_beta";
    pub const ONLINE_SCORE: &str = "audit_online_score";
    pub const BAD_AUDIT_DQS: &str = "bad_audit_dqs";
    pub const UNKNOWN_SUSPENSION_DQS: &str = "unknown_suspension_dqs";
    pub const OFFLINE_DQS: &str = "offline_dqs";
}

/// Receiver of named numeric observations and event counters.
pub trait ReputationObserver: Send + Sync {
    /// Record the current value of a named quantity.
    fn observe(&self, name: &'static str, value: f64);

    /// Count one occurrence of a named event.
    fn mark(&self, name: &'static str);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReputationObserver for NoopObserver {
    fn observe(&self, _name: &'static str, _value: f64) {}

    fn mark(&self, _name: &'static str) {}
}

/// Observer that forwards observations as `trace`-level tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReputationObserver for TracingObserver {
    fn observe(&self, name: &'static str, value: f64) {
        tracing::trace!(metric = name, value, "observe");
    }

    fn mark(&self, name: &'static str) {
        tracing::trace!(metric = name, "mark");
    }
}

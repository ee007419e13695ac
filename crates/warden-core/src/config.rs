// crates/warden-core/src/config.rs
//
// Configuration bundle for reputation updates.
//
// Every option has a serde default so a partial TOML table is valid. The
// bundle is passed by reference to each update, so callers may replace it
// between calls without affecting updates already in flight.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// Upper bound accepted for any duration option (100 years).
const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 3600;

/// Parameters of the belief update, vetting, and unknown-audit suspension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Decay factor applied to prior alpha/beta on every audit, 0 < λ <= 1.
    #[serde(default = "default_audit_lambda")]
    pub audit_lambda: f64,

    /// Weight added to alpha (success) or beta (failure) per audit, w > 0.
    #[serde(default = "default_audit_weight")]
    pub audit_weight: f64,

    /// Reputation at or below which a node is disqualified (normal pair)
    /// or suspended (unknown pair), 0 < θ < 1.
    #[serde(default = "default_audit_dq")]
    pub audit_dq: f64,

    /// Total audits after which a node is vetted.
    #[serde(default = "default_audits_required_for_vetting")]
    pub audits_required_for_vetting: u64,

    /// How long a node may stay suspended for unknown audits before it is
    /// disqualified (when `suspension_dq_enabled`).
    #[serde(default = "default_suspension_grace_period_secs")]
    pub suspension_grace_period_secs: u64,

    /// Whether unknown-audit suspension can escalate to disqualification.
    #[serde(default)]
    pub suspension_dq_enabled: bool,

    /// Alpha assigned to both belief pairs of a newly created record.
    #[serde(default = "default_initial_alpha")]
    pub initial_alpha: f64,

    /// Beta assigned to both belief pairs of a newly created record.
    #[serde(default = "default_initial_beta")]
    pub initial_beta: f64,

    /// Online/offline tracking parameters.
    #[serde(default)]
    pub audit_history: AuditHistoryConfig,
}

/// Parameters of the rolling online-score history and offline suspension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistoryConfig {
    /// Width of one history window. Must divide `tracking_period_secs`.
    #[serde(default = "default_window_size_secs")]
    pub window_size_secs: u64,

    /// Lookback span over which windows are retained and aggregated.
    #[serde(default = "default_tracking_period_secs")]
    pub tracking_period_secs: u64,

    /// Time an under-review node is given before its tracking period starts.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Online score below which a node is penalized, 0 < θ < 1.
    #[serde(default = "default_offline_threshold")]
    pub offline_threshold: f64,

    /// Whether a node still offline after review is disqualified.
    #[serde(default)]
    pub offline_dq_enabled: bool,

    /// Whether offline suspension and review are tracked at all.
    #[serde(default = "default_offline_suspension_enabled")]
    pub offline_suspension_enabled: bool,
}

fn default_audit_lambda() -> f64 {
    0.999
}

fn default_audit_weight() -> f64 {
    1.0
}

fn default_audit_dq() -> f64 {
    0.96
}

fn default_audits_required_for_vetting() -> u64 {
    100
}

fn default_suspension_grace_period_secs() -> u64 {
    7 * 24 * 3600
}

fn default_initial_alpha() -> f64 {
    1000.0
}

fn default_initial_beta() -> f64 {
    1.0
}

fn default_window_size_secs() -> u64 {
    12 * 3600
}

fn default_tracking_period_secs() -> u64 {
    30 * 24 * 3600
}

fn default_grace_period_secs() -> u64 {
    7 * 24 * 3600
}

fn default_offline_threshold() -> f64 {
    0.6
}

fn default_offline_suspension_enabled() -> bool {
    true
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            audit_lambda: default_audit_lambda(),
            audit_weight: default_audit_weight(),
            audit_dq: default_audit_dq(),
            audits_required_for_vetting: default_audits_required_for_vetting(),
            suspension_grace_period_secs: default_suspension_grace_period_secs(),
            suspension_dq_enabled: false,
            initial_alpha: default_initial_alpha(),
            initial_beta: default_initial_beta(),
            audit_history: AuditHistoryConfig::default(),
        }
    }
}

impl Default for AuditHistoryConfig {
    fn default() -> Self {
        Self {
            window_size_secs: default_window_size_secs(),
            tracking_period_secs: default_tracking_period_secs(),
            grace_period_secs: default_grace_period_secs(),
            offline_threshold: default_offline_threshold(),
            offline_dq_enabled: false,
            offline_suspension_enabled: default_offline_suspension_enabled(),
        }
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_DURATION_SECS) as i64)
}

fn check_duration(name: &str, secs: u64) -> Result<(), WardenError> {
    if secs > MAX_DURATION_SECS {
        return Err(WardenError::InvalidConfig(format!(
            "{} must be at most {} seconds, got {}",
            name, MAX_DURATION_SECS, secs
        )));
    }
    Ok(())
}

fn check_open_unit(name: &str, value: f64) -> Result<(), WardenError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(WardenError::InvalidConfig(format!(
            "{} must be in (0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

impl ReputationConfig {
    /// Grace period for unknown-audit suspension.
    pub fn suspension_grace_period(&self) -> Duration {
        seconds(self.suspension_grace_period_secs)
    }

    /// Check every option against its allowed range.
    pub fn validate(&self) -> Result<(), WardenError> {
        if !(self.audit_lambda > 0.0 && self.audit_lambda <= 1.0) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_lambda must be in (0, 1], got {}",
                self.audit_lambda
            )));
        }
        if !(self.audit_weight > 0.0 && self.audit_weight.is_finite()) {
            return Err(WardenError::InvalidConfig(format!(
                "audit_weight must be positive, got {}",
                self.audit_weight
            )));
        }
        check_open_unit("audit_dq", self.audit_dq)?;
        if !(self.initial_alpha > 0.0 && self.initial_alpha.is_finite())
            || !(self.initial_beta > 0.0 && self.initial_beta.is_finite())
        {
            return Err(WardenError::InvalidConfig(format!(
                "initial_alpha and initial_beta must be positive, got {} and {}",
                self.initial_alpha, self.initial_beta
            )));
        }
        check_duration("suspension_grace_period_secs", self.suspension_grace_period_secs)?;
        self.audit_history.validate()
    }
}

impl AuditHistoryConfig {
    pub fn window_size(&self) -> Duration {
        seconds(self.window_size_secs)
    }

    pub fn tracking_period(&self) -> Duration {
        seconds(self.tracking_period_secs)
    }

    pub fn grace_period(&self) -> Duration {
        seconds(self.grace_period_secs)
    }

    /// Number of complete windows that make up one tracking period.
    pub fn windows_per_tracking_period(&self) -> usize {
        if self.window_size_secs == 0 {
            return 0;
        }
        (self.tracking_period_secs / self.window_size_secs) as usize
    }

    /// Check every option against its allowed range.
    pub fn validate(&self) -> Result<(), WardenError> {
        if self.window_size_secs == 0 {
            return Err(WardenError::InvalidConfig(
                "window_size_secs must be positive".to_string(),
            ));
        }
        check_duration("window_size_secs", self.window_size_secs)?;
        check_duration("tracking_period_secs", self.tracking_period_secs)?;
        check_duration("grace_period_secs", self.grace_period_secs)?;
        if self.tracking_period_secs % self.window_size_secs != 0 {
            return Err(WardenError::InvalidConfig(format!(
                "window_size_secs ({}) must divide tracking_period_secs ({})",
                self.window_size_secs, self.tracking_period_secs
            )));
        }
        check_open_unit("offline_threshold", self.offline_threshold)
    }
}

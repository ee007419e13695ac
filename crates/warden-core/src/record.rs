// crates/warden-core/src/record.rs
//
// Per-node reputation and audit history records.
//
// One `NodeReputation` exists per node. It is created lazily on the first
// audit event for the node and is never deleted by the trust engine. Once
// `disqualified` is set, no field of the record changes again through the
// audit path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReputationConfig;
use crate::identity::NodeId;
use crate::status::ReputationStatus;

/// Belief parameters, counters, and status timestamps of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationRecord {
    pub node_id: NodeId,

    /// Success/failure belief pair. Both strictly positive.
    pub audit_alpha: f64,
    pub audit_beta: f64,

    /// Success/unknown belief pair, tracked separately from hard failures.
    pub unknown_audit_alpha: f64,
    pub unknown_audit_beta: f64,

    pub total_audit_count: u64,
    pub audit_success_count: u64,

    /// Set once when `total_audit_count` first reaches the vetting threshold.
    pub vetted_at: Option<DateTime<Utc>>,
    /// Terminal. Once set the record is frozen.
    pub disqualified: Option<DateTime<Utc>>,
    pub unknown_audit_suspended: Option<DateTime<Utc>>,
    pub offline_suspended: Option<DateTime<Utc>>,
    pub under_review: Option<DateTime<Utc>>,

    /// Cached copy of the audit history score, in [0, 1].
    pub online_score: f64,
    pub contained: bool,

    pub last_contact_success: Option<DateTime<Utc>>,
    pub last_contact_failure: Option<DateTime<Utc>>,
}

impl ReputationRecord {
    /// Create a fresh record with both belief pairs set to the given prior.
    pub fn new(node_id: NodeId, initial_alpha: f64, initial_beta: f64) -> Self {
        Self {
            node_id,
            audit_alpha: initial_alpha,
            audit_beta: initial_beta,
            unknown_audit_alpha: initial_alpha,
            unknown_audit_beta: initial_beta,
            total_audit_count: 0,
            audit_success_count: 0,
            vetted_at: None,
            disqualified: None,
            unknown_audit_suspended: None,
            offline_suspended: None,
            under_review: None,
            online_score: 1.0,
            contained: false,
            last_contact_success: None,
            last_contact_failure: None,
        }
    }

    /// `alpha / (alpha + beta)` of the success/failure pair.
    pub fn audit_reputation(&self) -> f64 {
        self.audit_alpha / (self.audit_alpha + self.audit_beta)
    }

    /// `alpha / (alpha + beta)` of the success/unknown pair.
    pub fn unknown_audit_reputation(&self) -> f64 {
        self.unknown_audit_alpha / (self.unknown_audit_alpha + self.unknown_audit_beta)
    }

    pub fn is_disqualified(&self) -> bool {
        self.disqualified.is_some()
    }

    /// Snapshot of the externally visible status fields.
    pub fn status(&self) -> ReputationStatus {
        ReputationStatus {
            contained: self.contained,
            disqualified: self.disqualified,
            unknown_audit_suspended: self.unknown_audit_suspended,
            offline_suspended: self.offline_suspended,
            vetted_at: self.vetted_at,
        }
    }

    /// Overwrite the externally visible status fields.
    pub fn apply_status(&mut self, status: &ReputationStatus) {
        self.contained = status.contained;
        self.disqualified = status.disqualified;
        self.unknown_audit_suspended = status.unknown_audit_suspended;
        self.offline_suspended = status.offline_suspended;
        self.vetted_at = status.vetted_at;
    }
}

/// One fixed-size bucket of online/offline observation counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWindow {
    /// Observation time truncated to the window size.
    pub window_start: DateTime<Utc>,
    pub total_count: u32,
    pub online_count: u32,
}

impl AuditWindow {
    pub fn new(window_start: DateTime<Utc>) -> Self {
        Self {
            window_start,
            total_count: 0,
            online_count: 0,
        }
    }

    /// Fraction of observations in this window that found the node online.
    /// An empty window counts as fully online.
    pub fn online_ratio(&self) -> f64 {
        if self.total_count == 0 {
            return 1.0;
        }
        self.online_count as f64 / self.total_count as f64
    }
}

/// Rolling online/offline history of one node.
///
/// Windows are ordered by `window_start` ascending with no duplicates. The
/// last window is the one currently being filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditHistory {
    pub windows: Vec<AuditWindow>,
    /// Mean online ratio of every window except the last, in [0, 1].
    pub score: f64,
}

impl AuditHistory {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
            score: 1.0,
        }
    }

    /// The window currently being filled, if any.
    pub fn latest_window(&self) -> Option<&AuditWindow> {
        self.windows.last()
    }
}

impl Default for AuditHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Reputation and audit history of one node, persisted as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReputation {
    pub record: ReputationRecord,
    pub history: AuditHistory,
}

impl NodeReputation {
    /// Neutral record with the configured prior and an empty history.
    pub fn new(node_id: NodeId, config: &ReputationConfig) -> Self {
        Self {
            record: ReputationRecord::new(node_id, config.initial_alpha, config.initial_beta),
            history: AuditHistory::new(),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.record.node_id
    }
}

// crates/warden-core/src/status.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally visible status of a node, consumed by node selection.
///
/// This is the subset of the reputation record that decides whether a node
/// may receive new data. `changed` flags returned by updates compare these
/// fields only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationStatus {
    pub contained: bool,
    pub disqualified: Option<DateTime<Utc>>,
    pub unknown_audit_suspended: Option<DateTime<Utc>>,
    pub offline_suspended: Option<DateTime<Utc>>,
    pub vetted_at: Option<DateTime<Utc>>,
}

impl ReputationStatus {
    /// True when the node is neither disqualified nor suspended for any reason.
    pub fn is_eligible(&self) -> bool {
        self.disqualified.is_none()
            && self.unknown_audit_suspended.is_none()
            && self.offline_suspended.is_none()
    }
}

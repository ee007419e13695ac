// crates/warden-core/src/outcome.rs
//
// Audit outcomes reported by the audit-execution subsystem.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WardenError;
use crate::identity::NodeId;

/// Result class of one integrity check against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// The node returned the audited data correctly.
    Success,
    /// The node returned incorrect data or refused the audit.
    Failure,
    /// The audit was inconclusive (timeouts after contact, unexpected errors).
    Unknown,
    /// The node could not be reached at all.
    Offline,
}

impl AuditOutcome {
    /// Whether the node was reachable. Everything except `Offline` counts as online.
    pub fn is_online(self) -> bool {
        self != AuditOutcome::Offline
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Failure => write!(f, "failure"),
            AuditOutcome::Unknown => write!(f, "unknown"),
            AuditOutcome::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for AuditOutcome {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(AuditOutcome::Success),
            "failure" | "fail" => Ok(AuditOutcome::Failure),
            "unknown" => Ok(AuditOutcome::Unknown),
            "offline" => Ok(AuditOutcome::Offline),
            other => Err(WardenError::Serialization(format!(
                "unrecognized audit outcome: {}",
                other
            ))),
        }
    }
}

/// One audit outcome for one node, as produced by an auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub node_id: NodeId,
    pub outcome: AuditOutcome,
    pub observed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_offline_is_not_online() {
        assert!(AuditOutcome::Success.is_online());
        assert!(AuditOutcome::Failure.is_online());
        assert!(AuditOutcome::Unknown.is_online());
        assert!(!AuditOutcome::Offline.is_online());
    }

    #[test]
    fn parse_accepts_display_form() {
        for outcome in [
            AuditOutcome::Success,
            AuditOutcome::Failure,
            AuditOutcome::Unknown,
            AuditOutcome::Offline,
        ] {
            assert_eq!(outcome.to_string().parse::<AuditOutcome>().unwrap(), outcome);
        }
        assert!("maybe".parse::<AuditOutcome>().is_err());
    }

    #[test]
    fn event_deserializes_from_json_line() {
        let line = format!(
            "{{\"node_id\":\"{}\",\"outcome\":\"unknown\",\"observed_at\":\"2024-01-01T00:00:00Z\"}}",
            "01".repeat(32)
        );
        let event: AuditEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(event.outcome, AuditOutcome::Unknown);
        assert_eq!(event.node_id, NodeId::from_bytes([1u8; 32]));
    }
}

// crates/warden-cli/src/output.rs
//
// Output formatting utilities for the warden CLI.
// Supports table and JSON output modes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use warden_core::record::{AuditWindow, NodeReputation};
use warden_core::status::ReputationStatus;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "--".to_string(), |t| t.to_rfc3339())
}

/// One field/value row of a key-value table.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    fn new(field: &str, value: String) -> Self {
        Self {
            field: field.to_string(),
            value,
        }
    }
}

/// Rows describing a node's visible status.
pub fn status_rows(status: &ReputationStatus) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Contained", status.contained.to_string()),
        FieldRow::new("Disqualified", timestamp(status.disqualified)),
        FieldRow::new("Unknown-audit suspended", timestamp(status.unknown_audit_suspended)),
        FieldRow::new("Offline suspended", timestamp(status.offline_suspended)),
        FieldRow::new("Vetted", timestamp(status.vetted_at)),
    ]
}

/// Rows describing a node's full reputation record.
pub fn info_rows(rep: &NodeReputation) -> Vec<FieldRow> {
    let r = &rep.record;
    let mut rows = vec![
        FieldRow::new("Node", r.node_id.to_string()),
        FieldRow::new("Audit reputation", format!("{:.6}", r.audit_reputation())),
        FieldRow::new("Audit alpha/beta", format!("{:.4} / {:.4}", r.audit_alpha, r.audit_beta)),
        FieldRow::new(
            "Unknown-audit reputation",
            format!("{:.6}", r.unknown_audit_reputation()),
        ),
        FieldRow::new(
            "Unknown-audit alpha/beta",
            format!("{:.4} / {:.4}", r.unknown_audit_alpha, r.unknown_audit_beta),
        ),
        FieldRow::new(
            "Audits (success/total)",
            format!("{} / {}", r.audit_success_count, r.total_audit_count),
        ),
        FieldRow::new("Online score", format!("{:.4}", r.online_score)),
        FieldRow::new("Under review", timestamp(r.under_review)),
        FieldRow::new("Last contact success", timestamp(r.last_contact_success)),
        FieldRow::new("Last contact failure", timestamp(r.last_contact_failure)),
    ];
    rows.extend(status_rows(&r.status()));
    rows
}

/// A row in the audit history table.
#[derive(Tabled)]
pub struct WindowRow {
    #[tabled(rename = "Window start")]
    pub window_start: String,
    #[tabled(rename = "Online")]
    pub online_count: u32,
    #[tabled(rename = "Total")]
    pub total_count: u32,
    #[tabled(rename = "Ratio")]
    pub ratio: String,
}

impl From<&AuditWindow> for WindowRow {
    fn from(w: &AuditWindow) -> Self {
        Self {
            window_start: w.window_start.to_rfc3339(),
            online_count: w.online_count,
            total_count: w.total_count,
            ratio: format!("{:.3}", w.online_ratio()),
        }
    }
}

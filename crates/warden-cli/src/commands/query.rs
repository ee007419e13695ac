// crates/warden-cli/src/commands/query.rs
//
// Read-only commands: `warden status`, `warden history`, `warden info`,
// and `warden nodes`.

use serde::Serialize;
use tabled::Tabled;

use warden_core::NodeId;

use super::{CliError, Context};
use crate::output::{format_json, format_table, info_rows, status_rows, OutputFormat, WindowRow};

/// Run the status command.
pub async fn run_status(ctx: &Context, node: &NodeId) -> Result<(), CliError> {
    let status = ctx.service.get_status(node).await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&status)),
        OutputFormat::Table => {
            println!("Node {} ({})", node, if status.is_eligible() { "eligible" } else { "ineligible" });
            println!("{}", format_table(&status_rows(&status)));
        }
    }
    Ok(())
}

/// Run the history command.
pub async fn run_history(ctx: &Context, node: &NodeId) -> Result<(), CliError> {
    let history = ctx.service.get_audit_history(node).await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&history)),
        OutputFormat::Table => {
            println!("Online score: {:.4}", history.score);
            if history.windows.is_empty() {
                println!("No audit windows recorded.");
            } else {
                let rows: Vec<WindowRow> = history.windows.iter().map(WindowRow::from).collect();
                println!("{}", format_table(&rows));
            }
        }
    }
    Ok(())
}

/// Run the info command.
pub async fn run_info(ctx: &Context, node: &NodeId) -> Result<(), CliError> {
    let rep = ctx.service.get(node).await?;
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&rep)),
        OutputFormat::Table => println!("{}", format_table(&info_rows(&rep))),
    }
    Ok(())
}

#[derive(Tabled, Serialize)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node_id: String,
    #[tabled(rename = "Audit rep")]
    audit_reputation: String,
    #[tabled(rename = "Online")]
    online_score: String,
    #[tabled(rename = "Audits")]
    total_audits: u64,
    #[tabled(rename = "Eligible")]
    eligible: bool,
}

/// Run the nodes command.
pub async fn run_nodes(ctx: &Context) -> Result<(), CliError> {
    let ids = ctx.service.list_nodes().await?;
    let mut rows = Vec::with_capacity(ids.len());
    for id in &ids {
        let rep = ctx.service.get(id).await?;
        let record = &rep.record;
        rows.push(NodeRow {
            node_id: id.to_hex(),
            audit_reputation: format!("{:.4}", record.audit_reputation()),
            online_score: format!("{:.4}", record.online_score),
            total_audits: record.total_audit_count,
            eligible: record.status().is_eligible(),
        });
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&rows)),
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No nodes recorded.");
            } else {
                println!("{}", format_table(&rows));
                println!("{} node(s)", rows.len());
            }
        }
    }
    Ok(())
}

// crates/warden-cli/src/commands/admin.rs
//
// Administrative overrides: `warden set-status`, `warden disqualify`,
// `warden suspend`, and `warden unsuspend`.

use chrono::{DateTime, Utc};
use clap::Args;

use warden_core::{NodeId, ReputationStatus};

use super::{CliError, Context};
use crate::output::{format_json, format_table, status_rows, OutputFormat};

/// Arguments for `warden set-status`. Omitted timestamps are cleared.
#[derive(Debug, Args)]
pub struct SetStatusArgs {
    /// Node id (64 hex characters).
    pub node: NodeId,

    #[arg(long)]
    pub contained: bool,

    #[arg(long)]
    pub disqualified: Option<DateTime<Utc>>,

    #[arg(long = "unknown-suspended")]
    pub unknown_audit_suspended: Option<DateTime<Utc>>,

    #[arg(long)]
    pub offline_suspended: Option<DateTime<Utc>>,

    #[arg(long = "vetted")]
    pub vetted_at: Option<DateTime<Utc>>,
}

impl SetStatusArgs {
    fn status(&self) -> ReputationStatus {
        ReputationStatus {
            contained: self.contained,
            disqualified: self.disqualified,
            unknown_audit_suspended: self.unknown_audit_suspended,
            offline_suspended: self.offline_suspended,
            vetted_at: self.vetted_at,
        }
    }
}

/// Arguments for commands that act on one node at a point in time.
#[derive(Debug, Args)]
pub struct NodeAtArgs {
    /// Node id (64 hex characters).
    pub node: NodeId,

    /// Effective time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

fn print_status(ctx: &Context, heading: &str, status: &ReputationStatus) {
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(status)),
        OutputFormat::Table => {
            println!("{}", heading);
            println!("{}", format_table(&status_rows(status)));
        }
    }
}

/// Run the set-status command.
pub async fn run_set_status(ctx: &Context, args: &SetStatusArgs) -> Result<(), CliError> {
    let status = args.status();
    ctx.service.set_status(&args.node, &status).await?;
    print_status(ctx, &format!("Status of {} overwritten", args.node), &status);
    Ok(())
}

/// Run the disqualify command.
pub async fn run_disqualify(ctx: &Context, args: &NodeAtArgs) -> Result<(), CliError> {
    let at = args.at.unwrap_or_else(Utc::now);
    let status = ctx.service.disqualify_node(&args.node, at, &ctx.config).await?;
    print_status(ctx, &format!("Node {} disqualified", args.node), &status);
    Ok(())
}

/// Run the suspend command.
pub async fn run_suspend(ctx: &Context, args: &NodeAtArgs) -> Result<(), CliError> {
    let at = args.at.unwrap_or_else(Utc::now);
    let status = ctx
        .service
        .suspend_unknown_audit(&args.node, at, &ctx.config)
        .await?;
    print_status(ctx, &format!("Node {} suspended for unknown audits", args.node), &status);
    Ok(())
}

/// Run the unsuspend command.
pub async fn run_unsuspend(ctx: &Context, node: &NodeId) -> Result<(), CliError> {
    let status = ctx.service.unsuspend_unknown_audit(node, &ctx.config).await?;
    print_status(ctx, &format!("Unknown-audit suspension of {} lifted", node), &status);
    Ok(())
}

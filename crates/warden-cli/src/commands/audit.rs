// crates/warden-cli/src/commands/audit.rs
//
// `warden audit` and `warden replay`: feed audit outcomes into the
// reputation service.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use warden_core::{AuditEvent, AuditOutcome, NodeId, ReputationStatus, WardenError};

use super::{CliError, Context};
use crate::output::{format_json, format_table, status_rows, OutputFormat};

/// Arguments for `warden audit`.
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Node id (64 hex characters).
    pub node: NodeId,

    /// Audit outcome: success, failure, unknown, or offline.
    pub outcome: AuditOutcome,

    /// Observation time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for `warden replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// File of JSON audit events, one per line.
    pub file: PathBuf,

    /// Maximum number of events applied concurrently.
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}

#[derive(Serialize)]
struct AuditReport {
    node_id: NodeId,
    outcome: AuditOutcome,
    observed_at: DateTime<Utc>,
    changed: bool,
    status: ReputationStatus,
}

/// Summary of a replay run.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub changed: usize,
    pub stale: usize,
    pub failed: usize,
}

/// Run the audit command.
pub async fn run(ctx: &Context, args: &AuditArgs) -> Result<(), CliError> {
    let observed_at = args.at.unwrap_or_else(Utc::now);
    let (status, changed) = ctx
        .service
        .apply_audit(&args.node, args.outcome, observed_at, &ctx.config)
        .await?;

    match ctx.format {
        OutputFormat::Json => {
            let report = AuditReport {
                node_id: args.node,
                outcome: args.outcome,
                observed_at,
                changed,
                status,
            };
            println!("{}", format_json(&report));
        }
        OutputFormat::Table => {
            println!("Applied {} audit to {}", args.outcome, args.node);
            if changed {
                println!("Status changed.");
            }
            println!("{}", format_table(&status_rows(&status)));
        }
    }
    Ok(())
}

/// Parse a JSON-lines event file. Blank lines are skipped.
pub fn parse_events(contents: &str) -> Result<Vec<AuditEvent>, CliError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| CliError::BadEvent { line: i + 1, source })
        })
        .collect()
}

/// Apply events with at most `concurrency` in flight.
///
/// Events for the same node still apply one at a time inside the service,
/// but their relative order is not preserved, so out-of-order events for a
/// node may be rejected as stale.
pub async fn replay_events(
    ctx: &Context,
    events: Vec<AuditEvent>,
    concurrency: usize,
) -> Result<ReplaySummary, CliError> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for event in events {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| WardenError::Storage(format!("replay semaphore closed: {}", e)))?;
        let service = Arc::clone(&ctx.service);
        let config = ctx.config.clone();
        tasks.spawn(async move {
            let result = service.apply_event(&event, &config).await;
            drop(permit);
            (event, result)
        });
    }

    let mut summary = ReplaySummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (event, result) = joined?;
        match result {
            Ok((_, changed)) => {
                summary.applied += 1;
                if changed {
                    summary.changed += 1;
                }
            }
            Err(WardenError::StaleObservation { .. }) => summary.stale += 1,
            Err(e) => {
                tracing::error!(node_id = %event.node_id, error = %e, "Failed to apply audit");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Run the replay command.
pub async fn run_replay(ctx: &Context, args: &ReplayArgs) -> Result<(), CliError> {
    let contents = tokio::fs::read_to_string(&args.file).await?;
    let events = parse_events(&contents)?;
    tracing::info!(events = events.len(), file = %args.file.display(), "Replaying audits");

    let summary = replay_events(ctx, events, args.concurrency).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&summary)),
        OutputFormat::Table => {
            println!("Replay complete");
            println!("---------------");
            println!("  Applied:  {}", summary.applied);
            println!("  Changed:  {}", summary.changed);
            println!("  Stale:    {}", summary.stale);
            println!("  Failed:   {}", summary.failed);
        }
    }
    Ok(())
}

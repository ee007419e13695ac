// crates/warden-cli/src/main.rs
//
// CLI entrypoint for the Warden node trust engine.
//
// Applies audit outcomes to the local reputation database, replays audit
// logs, and exposes node status for inspection and administrative override.

mod commands;
mod config;
mod output;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::admin::{NodeAtArgs, SetStatusArgs};
use commands::audit::{AuditArgs, ReplayArgs};
use commands::Context;
use config::{expand_tilde, WardenConfig};
use output::OutputFormat;
use warden_core::NodeId;
use warden_reputation::{ReputationService, TracingObserver};
use warden_store::RocksStore;

/// Warden: audit-driven trust scoring for storage nodes.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about = "Audit-driven trust scoring for storage nodes")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.warden/config.toml")]
    config: String,

    /// Database directory. Overrides `data_dir` from the config file.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply one audit outcome to a node.
    Audit(AuditArgs),

    /// Show a node's status fields.
    Status { node: NodeId },

    /// Show a node's audit windows and online score.
    History { node: NodeId },

    /// Show a node's full reputation record.
    Info { node: NodeId },

    /// Overwrite a node's status fields.
    SetStatus(SetStatusArgs),

    /// Disqualify a node.
    Disqualify(NodeAtArgs),

    /// Suspend a node for unknown audits.
    Suspend(NodeAtArgs),

    /// Lift a node's unknown-audit suspension.
    Unsuspend { node: NodeId },

    /// Apply audit events from a JSON-lines file.
    Replay(ReplayArgs),

    /// List every node with a stored reputation.
    Nodes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = expand_tilde(&cli.config);
    let (config, load_error) = if std::path::Path::new(&config_path).exists() {
        match WardenConfig::load(&config_path) {
            Ok(c) => (c, None),
            Err(e) => (WardenConfig::default(), Some(e.to_string())),
        }
    } else {
        (WardenConfig::default(), None)
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = load_error {
        tracing::warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
    }

    let data_dir = expand_tilde(cli.data_dir.as_deref().unwrap_or(&config.data_dir));
    std::fs::create_dir_all(&data_dir)?;
    let store = RocksStore::open(&data_dir)?;
    tracing::debug!(data_dir = %data_dir, "Opened reputation store");

    let service = ReputationService::new(Arc::new(store))
        .with_observer(Arc::new(TracingObserver))
        .with_lock_shards(config.lock_shards);

    let ctx = Context {
        service: Arc::new(service),
        config: config.reputation,
        format: OutputFormat::from_json_flag(cli.json),
    };

    match &cli.command {
        Commands::Audit(args) => commands::audit::run(&ctx, args).await?,
        Commands::Status { node } => commands::query::run_status(&ctx, node).await?,
        Commands::History { node } => commands::query::run_history(&ctx, node).await?,
        Commands::Info { node } => commands::query::run_info(&ctx, node).await?,
        Commands::SetStatus(args) => commands::admin::run_set_status(&ctx, args).await?,
        Commands::Disqualify(args) => commands::admin::run_disqualify(&ctx, args).await?,
        Commands::Suspend(args) => commands::admin::run_suspend(&ctx, args).await?,
        Commands::Unsuspend { node } => commands::admin::run_unsuspend(&ctx, node).await?,
        Commands::Replay(args) => commands::audit::run_replay(&ctx, args).await?,
        Commands::Nodes => commands::query::run_nodes(&ctx).await?,
    }

    Ok(())
}

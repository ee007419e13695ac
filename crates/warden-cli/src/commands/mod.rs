// crates/warden-cli/src/commands/mod.rs
//
// CLI subcommand implementations for the warden tool.

pub mod admin;
pub mod audit;
pub mod query;

use std::sync::Arc;

use thiserror::Error;
use warden_core::{ReputationConfig, WardenError};
use warden_reputation::ReputationService;
use warden_store::RocksStore;

use crate::output::OutputFormat;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Warden(#[from] WardenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    BadEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything a command needs: the service, the active parameters, and
/// the output mode.
pub struct Context {
    pub service: Arc<ReputationService<RocksStore>>,
    pub config: ReputationConfig,
    pub format: OutputFormat,
}

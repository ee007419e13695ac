use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type shared by every crate in the Warden workspace.
#[derive(Debug, Error)]
pub enum WardenError {
    /// The observation falls in a window older than the node's latest audit
    /// window. Callers should drop or log the event rather than retry it.
    #[error("Stale observation: window {window_start} precedes latest window {latest_window_start}")]
    StaleObservation {
        /// Start of the window the rejected observation belongs to.
        window_start: DateTime<Utc>,
        /// Start of the most recent window already recorded.
        latest_window_start: DateTime<Utc>,
    },

    /// Storage layer error (RocksDB, transaction failure). Retry with backoff.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No record exists for the requested node.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The observation time cannot be placed in a history window.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl WardenError {
    /// True for errors a caller may retry (transient persistence failures).
    pub fn is_retryable(&self) -> bool {
        matches!(self, WardenError::Storage(_))
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(e: serde_json::Error) -> Self {
        WardenError::Serialization(e.to_string())
    }
}

// crates/warden-core/src/lib.rs
//
// warden-core: Core types, configuration, and store traits for the Warden
// node trust engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the reputation and audit history records kept per storage node,
// the configuration bundle that parameterizes every reputation update, the
// error type, and the store trait implemented by warden-store.

pub mod config;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod record;
pub mod status;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use warden_core::ReputationRecord;`

pub use config::{AuditHistoryConfig, ReputationConfig};
pub use error::WardenError;
pub use identity::NodeId;
pub use outcome::{AuditEvent, AuditOutcome};
pub use record::{AuditHistory, AuditWindow, NodeReputation, ReputationRecord};
pub use status::ReputationStatus;
pub use traits::ReputationStore;

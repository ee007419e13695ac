// crates/warden-reputation/src/lib.rs
//
// warden-reputation: Belief updates, audit history, suspension and
// disqualification decisions for the Warden node trust engine.
//
// Every audit outcome for a node flows through `ReputationService`, which
// serializes updates per node, advances the rolling online history, applies
// the exponentially decayed belief update, and runs the suspension and
// disqualification state machine before persisting the result.

pub mod belief;
pub mod decision;
pub mod history;
pub mod locks;
pub mod observer;
pub mod service;

pub use decision::{FieldUpdate, ReputationUpdate};
pub use history::HistoryUpdate;
pub use observer::{NoopObserver, ReputationObserver, TracingObserver};
pub use service::{LoadedReputation, ReputationService};

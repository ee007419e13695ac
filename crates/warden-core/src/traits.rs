// crates/warden-core/src/traits.rs

use async_trait::async_trait;

use crate::error::WardenError;
use crate::identity::NodeId;
use crate::record::NodeReputation;

/// Trait for durable per-node reputation storage.
///
/// A `NodeReputation` bundles the reputation record and the audit history,
/// so `save` persists both in one write. Implementations do not serialize
/// concurrent read-modify-write sequences themselves; the orchestrator in
/// warden-reputation holds a per-node lock around them.
///
/// Implemented by warden-store (RocksDB and in-memory backends).
#[async_trait]
pub trait ReputationStore: Send + Sync {
    /// Retrieve the reputation of a node, or `None` if it has never been audited.
    async fn load(&self, node_id: &NodeId) -> Result<Option<NodeReputation>, WardenError>;

    /// Save a node's reputation. Overwrites any existing entry for the node.
    async fn save(&self, reputation: &NodeReputation) -> Result<(), WardenError>;

    /// List the ids of all nodes with a stored reputation.
    async fn list_nodes(&self) -> Result<Vec<NodeId>, WardenError>;
}

// crates/warden-store/src/memory.rs
//
// In-memory reputation store.
//
// Backed by a HashMap behind a tokio RwLock. Used by tests and by ephemeral
// runs that do not need durability.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::record::NodeReputation;
use warden_core::traits::ReputationStore;

/// Non-durable `ReputationStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<NodeId, NodeReputation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes with a stored reputation.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ReputationStore for MemoryStore {
    async fn load(&self, node_id: &NodeId) -> Result<Option<NodeReputation>, WardenError> {
        Ok(self.entries.read().await.get(node_id).cloned())
    }

    async fn save(&self, reputation: &NodeReputation) -> Result<(), WardenError> {
        self.entries
            .write()
            .await
            .insert(*reputation.node_id(), reputation.clone());
        Ok(())
    }

    async fn list_nodes(&self) -> Result<Vec<NodeId>, WardenError> {
        let mut nodes: Vec<NodeId> = self.entries.read().await.keys().copied().collect();
        nodes.sort();
        Ok(nodes)
    }
}

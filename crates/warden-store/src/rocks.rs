// crates/warden-store/src/rocks.rs
//
// RocksDB-backed persistent storage for node reputations.
//
// Key format:
//   - `reputation:{node_id_hex}` -> JSON-serialized NodeReputation
//
// The reputation record and the audit history share one key, so a single
// put persists both atomically.

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use warden_core::error::WardenError;
use warden_core::identity::NodeId;
use warden_core::record::NodeReputation;
use warden_core::traits::ReputationStore;

const REPUTATION_PREFIX: &str = "reputation:";

/// RocksDB wrapper implementing the `ReputationStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, WardenError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| WardenError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self { db })
    }

    /// Build the key for a node: `reputation:{hex}`.
    fn reputation_key(node_id: &NodeId) -> Vec<u8> {
        format!("{}{}", REPUTATION_PREFIX, node_id.to_hex()).into_bytes()
    }

    /// Put raw bytes into RocksDB, mapping errors to WardenError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), WardenError> {
        self.db
            .put(key, value)
            .map_err(|e| WardenError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Get raw bytes from RocksDB, mapping errors to WardenError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, WardenError> {
        self.db
            .get(key)
            .map_err(|e| WardenError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Load a node's reputation without going through the async trait.
    pub fn load_sync(&self, node_id: &NodeId) -> Result<Option<NodeReputation>, WardenError> {
        match self.get_raw(&Self::reputation_key(node_id))? {
            Some(bytes) => {
                let reputation: NodeReputation = serde_json::from_slice(&bytes)?;
                Ok(Some(reputation))
            }
            None => Ok(None),
        }
    }

    /// Save a node's reputation synchronously.
    pub fn save_sync(&self, reputation: &NodeReputation) -> Result<(), WardenError> {
        let json = serde_json::to_vec(reputation)?;
        self.put_raw(&Self::reputation_key(reputation.node_id()), &json)
    }
}

#[async_trait]
impl ReputationStore for RocksStore {
    async fn load(&self, node_id: &NodeId) -> Result<Option<NodeReputation>, WardenError> {
        self.load_sync(node_id)
    }

    async fn save(&self, reputation: &NodeReputation) -> Result<(), WardenError> {
        self.save_sync(reputation)
    }

    async fn list_nodes(&self) -> Result<Vec<NodeId>, WardenError> {
        let prefix = REPUTATION_PREFIX.as_bytes();
        let mut nodes = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, _value) = item
                .map_err(|e| WardenError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }

            let hex_str = std::str::from_utf8(&key[prefix.len()..]).unwrap_or("");
            if let Ok(node_id) = hex_str.parse::<NodeId>() {
                nodes.push(node_id);
            }
        }

        Ok(nodes)
    }
}

// crates/warden-reputation/src/locks.rs
//
// Sharded per-node mutex table.
//
// Every read-modify-write of a node's reputation runs while holding the
// shard lock its node id hashes to, so two updates for the same node are
// linearized. Updates for nodes in different shards proceed in parallel;
// nodes that collide on a shard are serialized with each other, which only
// costs throughput. The hash is FNV-1a over the node id bytes, so a node
// always maps to the same shard.

use tokio::sync::{Mutex, MutexGuard};

use warden_core::identity::NodeId;

/// Default number of lock shards.
pub const DEFAULT_LOCK_SHARDS: usize = 256;

/// Table of mutexes keyed by a stable hash of the node id.
#[derive(Debug)]
pub struct NodeLockTable {
    shards: Vec<Mutex<()>>,
}

impl NodeLockTable {
    /// Create a table with `num_shards` locks (at least one).
    pub fn new(num_shards: usize) -> Self {
        let shards = (0..num_shards.max(1)).map(|_| Mutex::new(())).collect();
        Self { shards }
    }

    /// Deterministically map a node id to a shard index in `[0, num_shards)`.
    pub fn shard_for(&self, node_id: &NodeId) -> usize {
        let mut hash: u64 = 0xcbf29ce484222325; // FNV-1a offset basis
        for &byte in node_id.as_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3); // FNV-1a prime
        }
        (hash % self.shards.len() as u64) as usize
    }

    /// Wait for exclusive access to a node's reputation.
    pub async fn lock(&self, node_id: &NodeId) -> MutexGuard<'_, ()> {
        self.shards[self.shard_for(node_id)].lock().await
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }
}

impl Default for NodeLockTable {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_SHARDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shard_always_zero() {
        let table = NodeLockTable::new(1);
        for _ in 0..100 {
            assert_eq!(table.shard_for(&NodeId::random()), 0);
        }
    }

    #[test]
    fn zero_shards_is_clamped_to_one() {
        assert_eq!(NodeLockTable::new(0).num_shards(), 1);
    }

    #[test]
    fn assignment_is_deterministic_and_in_range() {
        let table = NodeLockTable::new(16);
        for _ in 0..100 {
            let id = NodeId::random();
            let shard = table.shard_for(&id);
            assert_eq!(shard, table.shard_for(&id));
            assert!(shard < 16);
        }
    }

    #[tokio::test]
    async fn same_node_lock_is_exclusive() {
        let table = NodeLockTable::new(8);
        let id = NodeId::from_bytes([3; 32]);
        let guard = table.lock(&id).await;
        let idx = table.shard_for(&id);
        assert!(table.shards[idx].try_lock().is_err());
        drop(guard);
        assert!(table.shards[idx].try_lock().is_ok());
    }
}

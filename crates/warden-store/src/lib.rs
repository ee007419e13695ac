// crates/warden-store/src/lib.rs
//
// warden-store: Storage layer for the Warden node trust engine.
//
// Provides a RocksDB-backed durable store and an in-memory store, both
// implementing `warden_core::ReputationStore`.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;

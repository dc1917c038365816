//! Snapshot stores
//!
//! Two backends behind one synchronous trait:
//! - **File** (default for the CLI): one JSON document per address under a
//!   base directory
//! - **Memory**: HashMap-backed, for tests and embedding
//!
//! Operations are plain blocking calls - each one is O(snapshot size) and
//! self-contained, so there is nothing to suspend on. Implementations must
//! be `Send + Sync` so a host may drive different addresses concurrently;
//! instances never read each other's state.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, OperationCounts};

use crate::error::{Result, StateError};
use crate::snapshot::Snapshot;

/// Storage backend for resource snapshots
pub trait SnapshotStore: Send + Sync {
    /// Get the snapshot at an address
    fn get(&self, address: &str) -> Result<Snapshot>;

    /// List all stored snapshots, ordered by address
    fn list(&self) -> Result<Vec<Snapshot>>;

    /// Store a new snapshot; fails if the address is taken
    fn create(&self, snapshot: &Snapshot) -> Result<()>;

    /// Replace the snapshot at an existing address
    fn update(&self, snapshot: &Snapshot) -> Result<()>;

    /// Remove and return the snapshot at an address
    fn delete(&self, address: &str) -> Result<Snapshot>;

    /// Check whether an address holds a snapshot
    fn exists(&self, address: &str) -> Result<bool> {
        match self.get(address) {
            Ok(_) => Ok(true),
            Err(StateError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Serialize a snapshot to JSON bytes
pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(snapshot).map_err(|e| StateError::Serialization(e.to_string()))
}

/// Deserialize a snapshot from JSON bytes
pub fn deserialize_snapshot(data: &[u8]) -> Result<Snapshot> {
    serde_json::from_slice(data).map_err(|e| StateError::Serialization(e.to_string()))
}

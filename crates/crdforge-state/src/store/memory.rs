//! In-memory snapshot store
//!
//! Stores snapshots in a HashMap, useful for unit tests and embedding
//! without touching the filesystem.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::SnapshotStore;
use crate::error::{Result, StateError};
use crate::snapshot::Snapshot;

/// In-memory snapshot store
#[derive(Clone, Default)]
pub struct MemoryStore {
    store: Arc<RwLock<HashMap<String, Snapshot>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed, for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub lists: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated snapshots
    pub fn with_snapshots(snapshots: Vec<Snapshot>) -> Self {
        let store = Self::new();
        {
            let mut map = store.store.write().unwrap();
            for snapshot in snapshots {
                map.insert(snapshot.address.clone(), snapshot);
            }
        }
        store
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        let mut ops = self.operations.write().unwrap();
        *ops = OperationCounts::default();
    }

    /// Count stored snapshots
    pub fn snapshot_count(&self) -> usize {
        self.store.read().unwrap().len()
    }

    fn count<F: FnOnce(&mut OperationCounts)>(&self, bump: F) {
        let mut ops = self.operations.write().unwrap();
        bump(&mut ops);
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, address: &str) -> Result<Snapshot> {
        self.count(|ops| ops.gets += 1);

        self.store
            .read()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| StateError::NotFound {
                address: address.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<Snapshot>> {
        self.count(|ops| ops.lists += 1);

        let mut snapshots: Vec<Snapshot> = self.store.read().unwrap().values().cloned().collect();
        snapshots.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(snapshots)
    }

    fn create(&self, snapshot: &Snapshot) -> Result<()> {
        self.count(|ops| ops.creates += 1);

        let mut store = self.store.write().unwrap();
        if store.contains_key(&snapshot.address) {
            return Err(StateError::AlreadyExists {
                address: snapshot.address.clone(),
            });
        }
        store.insert(snapshot.address.clone(), snapshot.clone());
        Ok(())
    }

    fn update(&self, snapshot: &Snapshot) -> Result<()> {
        self.count(|ops| ops.updates += 1);

        let mut store = self.store.write().unwrap();
        if !store.contains_key(&snapshot.address) {
            return Err(StateError::NotFound {
                address: snapshot.address.clone(),
            });
        }
        store.insert(snapshot.address.clone(), snapshot.clone());
        Ok(())
    }

    fn delete(&self, address: &str) -> Result<Snapshot> {
        self.count(|ops| ops.deletes += 1);

        self.store
            .write()
            .unwrap()
            .remove(address)
            .ok_or_else(|| StateError::NotFound {
                address: address.to_string(),
            })
    }
}

//! File-based snapshot store
//!
//! Stores one JSON document per address under a base directory. Slashes in
//! an address become subdirectories, so `Widget/sample` lands at
//! `<base>/Widget/sample.json`.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SnapshotStore, deserialize_snapshot, serialize_snapshot};
use crate::error::{Result, StateError};
use crate::snapshot::Snapshot;

/// File-based snapshot store
pub struct FileStore {
    /// Base directory for stored snapshots
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, address: &str) -> Result<PathBuf> {
        validate_address(address)?;
        Ok(self.base_dir.join(format!("{}.json", address)))
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.address)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serialize_snapshot(snapshot)?;
        std::fs::write(&path, data)?;
        debug!(address = %snapshot.address, id = snapshot.id, "wrote snapshot");
        Ok(())
    }

    fn read_snapshot(&self, path: &Path) -> Result<Snapshot> {
        let data = std::fs::read(path)?;
        deserialize_snapshot(&data)
    }

    /// Remove directories left empty between a deleted file and the base
    fn prune_empty_dirs(&self, from: &Path) {
        let mut dir = from.parent();
        while let Some(current) = dir {
            if current == self.base_dir {
                break;
            }
            let empty = std::fs::read_dir(current)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !empty {
                break;
            }
            let _ = std::fs::remove_dir(current);
            dir = current.parent();
        }
    }

    fn collect_snapshots(&self, dir: &Path, out: &mut Vec<Snapshot>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_snapshots(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "json") {
                out.push(self.read_snapshot(&path)?);
            }
        }
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, address: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(address)?;
        if !path.exists() {
            return Err(StateError::NotFound {
                address: address.to_string(),
            });
        }
        self.read_snapshot(&path)
    }

    fn list(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        self.collect_snapshots(&self.base_dir, &mut snapshots)?;
        snapshots.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(snapshots)
    }

    fn create(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.address)?;
        if path.exists() {
            return Err(StateError::AlreadyExists {
                address: snapshot.address.clone(),
            });
        }
        self.write_snapshot(snapshot)
    }

    fn update(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.address)?;
        if !path.exists() {
            return Err(StateError::NotFound {
                address: snapshot.address.clone(),
            });
        }
        self.write_snapshot(snapshot)
    }

    fn delete(&self, address: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(address)?;
        let snapshot = self.get(address)?;

        std::fs::remove_file(&path)?;
        self.prune_empty_dirs(&path);
        debug!(address, "deleted snapshot");

        Ok(snapshot)
    }
}

fn validate_address(address: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(StateError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        })
    };

    if address.is_empty() {
        return invalid("must not be empty");
    }
    if address.starts_with('/') || address.ends_with('/') {
        return invalid("must not start or end with '/'");
    }
    if address.contains('\\') {
        return invalid("must not contain '\\'");
    }
    if address.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return invalid("path segments must be non-empty and not '.' or '..'");
    }
    Ok(())
}

//! Persisted resource snapshots

use chrono::{DateTime, Utc};
use crdforge_core::Dynamic;
use crdforge_engine::SynthesizedManifest;
use serde::{Deserialize, Serialize};

/// One persisted resource instance
///
/// The snapshot is the whole source of truth for the instance: there is no
/// external system to reconcile against, so reading back a snapshot is the
/// full Read operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Store address of this instance
    pub address: String,

    /// Snapshot identifier, freshly assigned on every write
    pub id: i64,

    /// Revision number (1-indexed, increments with each update)
    pub revision: u32,

    /// Injected `apiVersion` constant
    pub api_version: String,

    /// Injected `kind` constant
    pub kind: String,

    /// Decoded metadata tree
    pub metadata: Dynamic,

    /// Decoded spec tree
    pub spec: Dynamic,

    /// Canonical YAML manifest
    pub yaml: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build the first snapshot of a new instance
    pub fn for_create(address: impl Into<String>, id: i64, manifest: &SynthesizedManifest) -> Self {
        let now = Utc::now();
        Self {
            address: address.into(),
            id,
            revision: 1,
            api_version: manifest.api_version.clone(),
            kind: manifest.kind.clone(),
            metadata: manifest.metadata.clone(),
            spec: manifest.spec.clone(),
            yaml: manifest.yaml.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the replacement snapshot for an update
    ///
    /// Full replacement, no merge: only the address, revision counter and
    /// creation timestamp carry over from the previous snapshot.
    pub fn for_update(previous: &Snapshot, id: i64, manifest: &SynthesizedManifest) -> Self {
        Self {
            address: previous.address.clone(),
            id,
            revision: previous.revision + 1,
            api_version: manifest.api_version.clone(),
            kind: manifest.kind.clone(),
            metadata: manifest.metadata.clone(),
            spec: manifest.spec.clone(),
            yaml: manifest.yaml.clone(),
            created_at: previous.created_at,
            updated_at: Utc::now(),
        }
    }

    /// The instance's `metadata.name`, if present
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Dynamic::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(yaml: &str) -> SynthesizedManifest {
        SynthesizedManifest {
            api_version: "example.io/v1".to_string(),
            kind: "Widget".to_string(),
            metadata: Dynamic::from_yaml_str("name: sample\n").unwrap(),
            spec: Dynamic::from_yaml_str("size: 4\n").unwrap(),
            yaml: yaml.to_string(),
        }
    }

    #[test]
    fn test_for_create() {
        let snapshot = Snapshot::for_create("Widget/sample", 7, &manifest("a: 1\n"));

        assert_eq!(snapshot.address, "Widget/sample");
        assert_eq!(snapshot.id, 7);
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.name(), Some("sample"));
        assert_eq!(snapshot.created_at, snapshot.updated_at);
    }

    #[test]
    fn test_for_update_replaces_content() {
        let first = Snapshot::for_create("Widget/sample", 7, &manifest("a: 1\n"));
        let second = Snapshot::for_update(&first, 9, &manifest("a: 2\n"));

        assert_eq!(second.address, first.address);
        assert_eq!(second.revision, 2);
        assert_eq!(second.id, 9);
        assert_eq!(second.yaml, "a: 2\n");
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = Snapshot::for_create("Widget/sample", 7, &manifest("a: 1\n"));
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(snapshot, decoded);
    }
}

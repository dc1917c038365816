//! Resource instance lifecycle
//!
//! Drives the Absent/Present state machine over a snapshot store:
//! - Create: Absent -> Present, assigning a fresh id
//! - Update: Present -> Present, full replacement with a fresh id
//! - Delete: Present -> Absent, unconditional, local only
//! - Read: a deliberate no-op refresh - the snapshot already is the source
//!   of truth, there is no external system to consult
//!
//! State is only written after the manifest was fully synthesized, so a
//! failed operation leaves prior state untouched.

use tracing::debug;

use crdforge_engine::SynthesizedManifest;

use crate::error::{Result, StateError};
use crate::id::IdSource;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;

/// What an apply ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
}

impl std::fmt::Display for Applied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
        }
    }
}

/// Lifecycle driver over a store and an id source
pub struct Lifecycle<'a> {
    store: &'a dyn SnapshotStore,
    ids: &'a IdSource,
}

impl<'a> Lifecycle<'a> {
    pub fn new(store: &'a dyn SnapshotStore, ids: &'a IdSource) -> Self {
        Self { store, ids }
    }

    /// Create a new instance at an address
    pub fn create(&self, address: &str, manifest: &SynthesizedManifest) -> Result<Snapshot> {
        let snapshot = Snapshot::for_create(address, self.ids.next(), manifest);
        self.store.create(&snapshot)?;
        debug!(address, id = snapshot.id, "created instance");
        Ok(snapshot)
    }

    /// Replace the instance at an address
    ///
    /// Full replacement: the new manifest is everything, nothing merges in
    /// from the previous snapshot.
    pub fn update(&self, address: &str, manifest: &SynthesizedManifest) -> Result<Snapshot> {
        let previous = self.store.get(address)?;
        let snapshot = Snapshot::for_update(&previous, self.ids.next(), manifest);
        self.store.update(&snapshot)?;
        debug!(address, id = snapshot.id, revision = snapshot.revision, "updated instance");
        Ok(snapshot)
    }

    /// Create or update, whichever the address calls for
    pub fn apply(
        &self,
        address: &str,
        manifest: &SynthesizedManifest,
    ) -> Result<(Snapshot, Applied)> {
        match self.store.get(address) {
            Ok(previous) => {
                let snapshot = Snapshot::for_update(&previous, self.ids.next(), manifest);
                self.store.update(&snapshot)?;
                debug!(address, id = snapshot.id, "updated instance");
                Ok((snapshot, Applied::Updated))
            }
            Err(StateError::NotFound { .. }) => {
                Ok((self.create(address, manifest)?, Applied::Created))
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the instance at an address
    ///
    /// Always succeeds: deleting an absent instance is a no-op returning
    /// `None`. No external system is notified because none exists.
    pub fn delete(&self, address: &str) -> Result<Option<Snapshot>> {
        match self.store.delete(address) {
            Ok(snapshot) => {
                debug!(address, "deleted instance");
                Ok(Some(snapshot))
            }
            Err(StateError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read the instance at an address, refreshing nothing
    pub fn read(&self, address: &str) -> Result<Option<Snapshot>> {
        match self.store.get(address) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(StateError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crdforge_core::Dynamic;
    use crdforge_crd::{CrdParser, compile};
    use crdforge_engine::Synthesizer;

    const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.io
spec:
  group: example.io
  names:
    kind: Widget
    plural: widgets
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          properties:
            spec:
              type: object
              properties:
                size:
                  type: integer
"#;

    fn manifest(size: i64) -> SynthesizedManifest {
        let def = CrdParser::parse(CRD).unwrap();
        let compiled = compile(&def, None).unwrap();
        let synthesizer = Synthesizer::new(&compiled);
        let config = Dynamic::from_yaml_str(&format!(
            "metadata:\n  name: my-res\nspec:\n  size: {}\n",
            size
        ))
        .unwrap();
        synthesizer.synthesize(&config).unwrap()
    }

    #[test]
    fn test_create_update_assigns_fresh_increasing_ids() {
        let store = MemoryStore::new();
        let ids = IdSource::counter();
        let lifecycle = Lifecycle::new(&store, &ids);

        let created = lifecycle.create("Widget/my-res", &manifest(1)).unwrap();
        let updated = lifecycle.update("Widget/my-res", &manifest(2)).unwrap();

        assert!(updated.id > created.id);
        assert_eq!(updated.revision, 2);
        assert!(updated.yaml.contains("size: 2"));
        assert!(!updated.yaml.contains("size: 1"));
    }

    #[test]
    fn test_clock_ids_differ_across_writes() {
        let store = MemoryStore::new();
        let ids = IdSource::clock();
        let lifecycle = Lifecycle::new(&store, &ids);

        let created = lifecycle.create("Widget/my-res", &manifest(1)).unwrap();
        let updated = lifecycle.update("Widget/my-res", &manifest(2)).unwrap();
        assert_ne!(created.id, updated.id);
    }

    #[test]
    fn test_update_requires_existing() {
        let store = MemoryStore::new();
        let ids = IdSource::counter();
        let lifecycle = Lifecycle::new(&store, &ids);

        let result = lifecycle.update("Widget/ghost", &manifest(1));
        assert!(matches!(result, Err(StateError::NotFound { .. })));
    }

    #[test]
    fn test_apply_creates_then_updates() {
        let store = MemoryStore::new();
        let ids = IdSource::counter();
        let lifecycle = Lifecycle::new(&store, &ids);

        let (_, first) = lifecycle.apply("Widget/my-res", &manifest(1)).unwrap();
        let (snapshot, second) = lifecycle.apply("Widget/my-res", &manifest(2)).unwrap();

        assert_eq!(first, Applied::Created);
        assert_eq!(second, Applied::Updated);
        assert_eq!(snapshot.revision, 2);
    }

    #[test]
    fn test_delete_leaves_no_trace_and_tolerates_absence() {
        let store = MemoryStore::new();
        let ids = IdSource::counter();
        let lifecycle = Lifecycle::new(&store, &ids);

        lifecycle.create("Widget/my-res", &manifest(1)).unwrap();

        let deleted = lifecycle.delete("Widget/my-res").unwrap();
        assert!(deleted.is_some());

        // Read after delete finds nothing; deleting again is a quiet no-op
        assert!(lifecycle.read("Widget/my-res").unwrap().is_none());
        assert!(lifecycle.delete("Widget/my-res").unwrap().is_none());
    }

    #[test]
    fn test_read_is_pure_lookup() {
        let store = MemoryStore::new();
        let ids = IdSource::counter();
        let lifecycle = Lifecycle::new(&store, &ids);

        let created = lifecycle.create("Widget/my-res", &manifest(1)).unwrap();
        let read = lifecycle.read("Widget/my-res").unwrap().unwrap();
        assert_eq!(created, read);

        // Nothing was written back by the read
        assert_eq!(store.operation_counts().updates, 0);
    }
}

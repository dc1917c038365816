//! CRD catalog
//!
//! Bulk loading of CustomResourceDefinitions from files and directories,
//! keyed by kind. Non-CRD documents in the input are skipped with a warning
//! so a directory of mixed manifests can be pointed at directly.

use std::path::Path;

use crdforge_core::Dynamic;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::definition::CrdDefinition;
use crate::error::{CrdError, Result};
use crate::parser::CrdParser;

/// A set of parsed CRDs, keyed by kind
#[derive(Debug, Default)]
pub struct CrdCatalog {
    definitions: IndexMap<String, CrdDefinition>,
}

impl CrdCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any existing entry for the same kind
    pub fn insert(&mut self, definition: CrdDefinition) {
        debug!(kind = %definition.names.kind, name = %definition.name, "registered CRD");
        self.definitions
            .insert(definition.names.kind.clone(), definition);
    }

    /// Look up a definition by kind
    pub fn get(&self, kind: &str) -> Option<&CrdDefinition> {
        self.definitions.get(kind)
    }

    /// Look up a definition by kind, failing if absent
    pub fn require(&self, kind: &str) -> Result<&CrdDefinition> {
        self.get(kind).ok_or_else(|| CrdError::UnknownKind {
            kind: kind.to_string(),
        })
    }

    /// The sole definition, if the catalog holds exactly one
    pub fn single(&self) -> Option<&CrdDefinition> {
        if self.definitions.len() == 1 {
            self.definitions.values().next()
        } else {
            None
        }
    }

    /// All registered kinds, in load order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrdDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Add every CRD in a (possibly multi-document) YAML string
    ///
    /// Returns the number of CRDs added. Empty documents and documents of
    /// other kinds are skipped; malformed YAML is an error.
    pub fn add_documents(&mut self, input: &str, source: &str) -> Result<usize> {
        let mut added = 0;

        for document in serde_yaml::Deserializer::from_str(input) {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|e| CrdError::invalid(format!("{}: not valid YAML: {}", source, e)))?;
            if matches!(value, serde_yaml::Value::Null) {
                continue;
            }
            let value = Dynamic::from_yaml(&value)?;

            if !CrdParser::is_crd(&value) {
                warn!(source, "skipping non-CRD document");
                continue;
            }

            self.insert(CrdParser::parse_value(&value)?);
            added += 1;
        }

        Ok(added)
    }

    /// Load CRDs from a single YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.add_documents(&content, &path.display().to_string())
    }

    /// Load CRDs from every `.yaml`/`.yml` file under a directory
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut added = 0;
        for entry in WalkDir::new(dir.as_ref()).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                CrdError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("walkdir error without IO cause")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_yaml = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if is_yaml {
                added += self.load_file(entry.path())?;
            }
        }
        Ok(added)
    }

    /// Load CRDs from a file or directory path
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }
}

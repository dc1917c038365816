//! Manifest synthesis
//!
//! The synthesizer is the one generic implementation behind every resource
//! kind: decode the configuration, run constraints, stamp the kind's fixed
//! `apiVersion`/`kind`, and serialize the value tree to canonical YAML.
//! Nothing is written anywhere on failure; the caller either gets a complete
//! manifest or an error.

use crdforge_core::{Diagnostics, Dynamic, ResourceKind};
use crdforge_crd::CompiledKind;
use indexmap::IndexMap;

use crate::decode::decode;
use crate::error::{EngineError, Result};

/// A fully synthesized manifest, ready for the state layer
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedManifest {
    /// Injected `apiVersion` constant
    pub api_version: String,
    /// Injected `kind` constant
    pub kind: String,
    /// Decoded metadata tree (null when the configuration omitted it)
    pub metadata: Dynamic,
    /// Decoded spec tree (null when the configuration omitted it)
    pub spec: Dynamic,
    /// Canonical YAML serialization of the whole value tree
    pub yaml: String,
}

impl SynthesizedManifest {
    /// The manifest's `metadata.name`, if present
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Dynamic::as_str)
    }
}

/// Per-kind synthesizer over a compiled CRD version
pub struct Synthesizer<'a> {
    compiled: &'a CompiledKind,
}

impl<'a> Synthesizer<'a> {
    pub fn new(compiled: &'a CompiledKind) -> Self {
        Self { compiled }
    }

    /// The fixed identity stamped onto every manifest
    pub fn kind(&self) -> &ResourceKind {
        &self.compiled.kind
    }

    /// Decode and constraint-check a configuration, reporting diagnostics
    ///
    /// Constraints run only on a cleanly decoded value, so one underlying
    /// problem is reported once rather than by both layers.
    pub fn check(&self, config: &Dynamic) -> Diagnostics {
        let result = decode(&self.compiled.tree, config);
        let mut diagnostics = result.diagnostics;
        if diagnostics.is_empty() {
            self.compiled
                .constraints
                .check(&Dynamic::Map(result.value), &mut diagnostics);
        }
        diagnostics
    }

    /// Synthesize a manifest from a configuration
    ///
    /// User-supplied values for `apiVersion`/`kind` (in either spelling) are
    /// silently discarded and replaced with this kind's constants. Fails
    /// with `Invalid` on any diagnostic and `Serialization` if YAML encoding
    /// fails; neither produces partial output.
    pub fn synthesize(&self, config: &Dynamic) -> Result<SynthesizedManifest> {
        let result = decode(&self.compiled.tree, config);
        let mut diagnostics = result.diagnostics;
        if diagnostics.is_empty() {
            self.compiled
                .constraints
                .check(&Dynamic::Map(result.value.clone()), &mut diagnostics);
        }
        if !diagnostics.is_empty() {
            return Err(EngineError::Invalid(diagnostics));
        }

        let api_version = self.compiled.kind.api_version();
        let kind = self.compiled.kind.kind.clone();

        let metadata = result.value.get("metadata").cloned().unwrap_or(Dynamic::Null);
        let spec = result.value.get("spec").cloned().unwrap_or(Dynamic::Null);

        let mut manifest = IndexMap::new();
        manifest.insert("apiVersion".to_string(), Dynamic::string(&api_version));
        manifest.insert("kind".to_string(), Dynamic::string(&kind));
        for (name, value) in result.value {
            manifest.insert(name, value);
        }

        let yaml = Dynamic::Map(manifest)
            .to_yaml_string()
            .map_err(|e| EngineError::Serialization {
                message: e.to_string(),
            })?;

        Ok(SynthesizedManifest {
            api_version,
            kind,
            metadata,
            spec,
            yaml,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdforge_crd::{CrdParser, compile};

    const XRD_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: compositeresourcedefinitions.apiextensions.crossplane.io
spec:
  group: apiextensions.crossplane.io
  scope: Cluster
  names:
    kind: CompositeResourceDefinition
    plural: compositeresourcedefinitions
    shortNames:
      - xrd
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          required:
            - spec
          properties:
            spec:
              type: object
              required:
                - group
                - names
              properties:
                group:
                  type: string
                names:
                  type: object
                  properties:
                    kind:
                      type: string
                    plural:
                      type: string
                versions:
                  type: array
                  items:
                    type: object
                    properties:
                      name:
                        type: string
                      served:
                        type: boolean
"#;

    fn compiled() -> CompiledKind {
        let def = CrdParser::parse(XRD_CRD).unwrap();
        compile(&def, None).unwrap()
    }

    #[test]
    fn test_end_to_end_synthesis() {
        let compiled = compiled();
        let synthesizer = Synthesizer::new(&compiled);

        let config = Dynamic::from_yaml_str(
            r#"
metadata:
  name: sample
spec:
  group: test.io
  names:
    kind: Foo
    plural: foos
  versions:
    - name: v1
      served: true
"#,
        )
        .unwrap();

        let manifest = synthesizer.synthesize(&config).unwrap();

        assert_eq!(manifest.api_version, "apiextensions.crossplane.io/v1");
        assert_eq!(manifest.kind, "CompositeResourceDefinition");
        assert_eq!(manifest.name(), Some("sample"));
        assert!(manifest.yaml.contains("apiVersion: apiextensions.crossplane.io/v1"));
        assert!(manifest.yaml.contains("kind: CompositeResourceDefinition"));
        assert!(manifest.yaml.contains("plural: foos"));
        // apiVersion comes first, then kind, then the configured tree
        assert!(manifest.yaml.starts_with("apiVersion:"));
    }

    #[test]
    fn test_api_version_and_kind_always_overwritten() {
        let compiled = compiled();
        let synthesizer = Synthesizer::new(&compiled);

        let config = Dynamic::from_yaml_str(
            r#"
apiVersion: hijacked.example.com/v999
kind: Hijacked
metadata:
  name: sample
spec:
  group: test.io
  names:
    kind: Foo
    plural: foos
"#,
        )
        .unwrap();

        let manifest = synthesizer.synthesize(&config).unwrap();
        assert_eq!(manifest.api_version, "apiextensions.crossplane.io/v1");
        assert_eq!(manifest.kind, "CompositeResourceDefinition");
        assert!(!manifest.yaml.contains("hijacked"));
        assert!(!manifest.yaml.contains("Hijacked"));
    }

    #[test]
    fn test_invalid_configuration_aborts() {
        let compiled = compiled();
        let synthesizer = Synthesizer::new(&compiled);

        let config = Dynamic::from_yaml_str("metadata:\n  name: UPPER\n").unwrap();
        let error = synthesizer.synthesize(&config).unwrap_err();

        let diagnostics = error.diagnostics().expect("expected Invalid");
        // Both the bad name and the missing spec are reported together
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_check_reports_constraint_violations() {
        let compiled = compiled();
        let synthesizer = Synthesizer::new(&compiled);

        let config = Dynamic::from_yaml_str(
            "metadata:\n  name: sample\nspec:\n  group: test.io\n  names: {}\n",
        )
        .unwrap();
        let diagnostics = synthesizer.check(&config);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_absent_optional_attributes_are_omitted() {
        let compiled = compiled();
        let synthesizer = Synthesizer::new(&compiled);

        let config = Dynamic::from_yaml_str(
            "metadata:\n  name: sample\nspec:\n  group: test.io\n  names:\n    kind: Foo\n",
        )
        .unwrap();

        let manifest = synthesizer.synthesize(&config).unwrap();
        assert!(!manifest.yaml.contains("versions"));
        assert!(!manifest.yaml.contains("null"));
        assert!(!manifest.yaml.contains("plural"));
    }
}

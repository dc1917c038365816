//! CLI command implementations and shared plumbing

pub mod apply;
pub mod delete;
pub mod list;
pub mod render;
pub mod schema;
pub mod show;
pub mod validate;

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};

use crdforge_core::{Dynamic, parse_set_overrides};
use crdforge_crd::{CompiledKind, CrdCatalog, compile};
use crdforge_engine::SynthesizedManifest;

/// Load the CRD catalog from a file or directory
pub fn load_catalog(path: &Path) -> Result<CrdCatalog> {
    let mut catalog = CrdCatalog::new();
    let added = catalog
        .load_path(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load CRDs from {}", path.display()))?;
    if added == 0 {
        miette::bail!(
            "no CustomResourceDefinitions found in {}",
            path.display()
        );
    }
    Ok(catalog)
}

/// Pick and compile the requested kind and version
///
/// When the catalog holds exactly one CRD, `--kind` may be omitted.
pub fn compile_kind(
    catalog: &CrdCatalog,
    kind: Option<&str>,
    version: Option<&str>,
) -> Result<CompiledKind> {
    let definition = match kind {
        Some(kind) => catalog.require(kind).into_diagnostic()?,
        None => catalog.single().ok_or_else(|| {
            miette::miette!(
                "--kind is required when more than one CRD is loaded (found: {})",
                catalog.kinds().collect::<Vec<_>>().join(", ")
            )
        })?,
    };
    compile(definition, version)
        .into_diagnostic()
        .wrap_err("Failed to compile CRD schema")
}

/// Load configuration files in order and apply `--set` overrides on top
pub fn load_config(files: &[PathBuf], set: &[String]) -> Result<Dynamic> {
    let mut config = Dynamic::object();

    for file in files {
        let content = std::fs::read_to_string(file)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
        let value = Dynamic::from_yaml_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to parse {}", file.display()))?;
        config.merge(&value);
    }

    for (path, value) in parse_set_overrides(set).into_diagnostic()? {
        config.set(&path, value);
    }

    Ok(config)
}

/// Default snapshot address for a manifest: `<kind>/<metadata.name>`
pub fn default_address(manifest: &SynthesizedManifest) -> Result<String> {
    let name = manifest.name().ok_or_else(|| {
        miette::miette!("configuration has no metadata.name; pass --address explicitly")
    })?;
    Ok(format!("{}/{}", manifest.kind, name))
}

//! Apply command - synthesize and store a snapshot

use console::style;
use crdforge_engine::{EngineError, Synthesizer};
use crdforge_state::{FileStore, IdSource, Lifecycle};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};

use super::{compile_kind, default_address, load_catalog, load_config};
use crate::display::display_diagnostics;
use crate::exit_codes;

pub fn run(
    crd: &Path,
    kind: Option<&str>,
    version: Option<&str>,
    config_files: &[PathBuf],
    set: &[String],
    address: Option<&str>,
    state_dir: &Path,
) -> Result<()> {
    let catalog = load_catalog(crd)?;
    let compiled = compile_kind(&catalog, kind, version)?;
    let config = load_config(config_files, set)?;

    let synthesizer = Synthesizer::new(&compiled);
    let manifest = match synthesizer.synthesize(&config) {
        Ok(manifest) => manifest,
        Err(EngineError::Invalid(diagnostics)) => {
            display_diagnostics(&compiled.kind.to_string(), &diagnostics);
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Err(e) => {
            return Err(e)
                .into_diagnostic()
                .wrap_err("Failed to render manifest");
        }
    };

    let address = match address {
        Some(address) => address.to_string(),
        None => default_address(&manifest)?,
    };

    let store = FileStore::new(state_dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open state directory {}", state_dir.display()))?;
    let ids = IdSource::clock();
    let lifecycle = Lifecycle::new(&store, &ids);

    let (snapshot, applied) = lifecycle
        .apply(&address, &manifest)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to store snapshot at {}", address))?;

    println!(
        "{} {} {} (id {}, revision {})",
        style("✓").green(),
        applied,
        address,
        snapshot.id,
        snapshot.revision
    );

    Ok(())
}

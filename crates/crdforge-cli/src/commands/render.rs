//! Render command - synthesize a manifest and print it

use console::style;
use crdforge_engine::{EngineError, Synthesizer};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};

use super::{compile_kind, load_catalog, load_config};
use crate::display::display_diagnostics;
use crate::exit_codes;

pub fn run(
    crd: &Path,
    kind: Option<&str>,
    version: Option<&str>,
    config_files: &[PathBuf],
    set: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(crd)?;
    let compiled = compile_kind(&catalog, kind, version)?;
    let config = load_config(config_files, set)?;

    let synthesizer = Synthesizer::new(&compiled);
    match synthesizer.synthesize(&config) {
        Ok(manifest) => {
            match output {
                Some(path) => {
                    std::fs::write(path, &manifest.yaml)
                        .into_diagnostic()
                        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "{} Wrote {} manifest to {}",
                        style("✓").green(),
                        compiled.kind,
                        path.display()
                    );
                }
                None => print!("{}", manifest.yaml),
            }
            Ok(())
        }
        Err(EngineError::Invalid(diagnostics)) => {
            display_diagnostics(&compiled.kind.to_string(), &diagnostics);
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Err(e) => Err(e).into_diagnostic().wrap_err("Failed to render manifest"),
    }
}

//! Validate command - check configuration against a CRD schema

use console::style;
use crdforge_engine::Synthesizer;
use miette::Result;
use std::path::{Path, PathBuf};

use super::{compile_kind, load_catalog, load_config};
use crate::display::{diagnostics_json, display_diagnostics};
use crate::exit_codes;

pub fn run(
    crd: &Path,
    kind: Option<&str>,
    version: Option<&str>,
    config_files: &[PathBuf],
    set: &[String],
    json_output: bool,
) -> Result<()> {
    let catalog = load_catalog(crd)?;
    let compiled = compile_kind(&catalog, kind, version)?;
    let config = load_config(config_files, set)?;

    if !json_output {
        println!(
            "{} Validating configuration for {}",
            style("→").blue(),
            compiled.kind
        );
    }

    let synthesizer = Synthesizer::new(&compiled);
    let diagnostics = synthesizer.check(&config);

    if json_output {
        let output = serde_json::json!({
            "valid": diagnostics.is_empty(),
            "kind": compiled.kind.to_string(),
            "diagnostics": diagnostics_json(&diagnostics),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );

        if !diagnostics.is_empty() {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
    } else if diagnostics.is_empty() {
        println!("  {} Configuration is valid", style("✓").green());
        println!();
        println!("{} Validation passed!", style("✓").green().bold());
    } else {
        display_diagnostics(&compiled.kind.to_string(), &diagnostics);
        std::process::exit(exit_codes::VALIDATION_ERROR);
    }

    Ok(())
}

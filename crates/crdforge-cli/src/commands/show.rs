//! Show command - print one stored snapshot

use console::style;
use crdforge_state::{FileStore, IdSource, Lifecycle};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

use crate::exit_codes;

pub fn run(address: &str, state_dir: &Path, json_output: bool) -> Result<()> {
    let store = FileStore::new(state_dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open state directory {}", state_dir.display()))?;
    let ids = IdSource::clock();
    let lifecycle = Lifecycle::new(&store, &ids);

    let Some(snapshot) = lifecycle.read(address).into_diagnostic()? else {
        eprintln!("{} nothing stored at {}", style("✗").red(), address);
        std::process::exit(exit_codes::STATE_ERROR);
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot)
                .into_diagnostic()
                .wrap_err("Failed to encode snapshot")?
        );
    } else {
        print!("{}", snapshot.yaml);
    }

    Ok(())
}

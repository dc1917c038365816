//! Delete command - remove a stored snapshot

use console::style;
use crdforge_state::{FileStore, IdSource, Lifecycle};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

pub fn run(address: &str, state_dir: &Path) -> Result<()> {
    let store = FileStore::new(state_dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open state directory {}", state_dir.display()))?;
    let ids = IdSource::clock();
    let lifecycle = Lifecycle::new(&store, &ids);

    match lifecycle.delete(address).into_diagnostic()? {
        Some(snapshot) => {
            println!(
                "{} deleted {} (was id {}, revision {})",
                style("✓").green(),
                address,
                snapshot.id,
                snapshot.revision
            );
        }
        None => {
            println!(
                "{} nothing stored at {}",
                style("⚠").yellow(),
                address
            );
        }
    }

    Ok(())
}

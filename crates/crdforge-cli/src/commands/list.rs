//! List command - show stored snapshots

use crdforge_state::{FileStore, SnapshotStore};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

pub fn run(state_dir: &Path) -> Result<()> {
    let store = FileStore::new(state_dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open state directory {}", state_dir.display()))?;

    let snapshots = store.list().into_diagnostic()?;
    if snapshots.is_empty() {
        println!("No snapshots stored.");
        return Ok(());
    }

    println!(
        "{:<40} {:<30} {:>8} {:>20}  {}",
        "ADDRESS", "KIND", "REVISION", "ID", "UPDATED"
    );
    for snapshot in snapshots {
        println!(
            "{:<40} {:<30} {:>8} {:>20}  {}",
            snapshot.address,
            snapshot.kind,
            snapshot.revision,
            snapshot.id,
            snapshot.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

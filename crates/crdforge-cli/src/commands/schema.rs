//! Schema command - print the compiled attribute tree of a CRD version

use console::style;
use miette::Result;
use std::path::Path;

use super::{compile_kind, load_catalog};
use crate::display::render_tree;

pub fn run(crd: &Path, kind: Option<&str>, version: Option<&str>) -> Result<()> {
    let catalog = load_catalog(crd)?;
    let compiled = compile_kind(&catalog, kind, version)?;

    println!("{} ({})", style(&compiled.kind).cyan().bold(), compiled.scope);
    println!();
    print!("{}", render_tree(&compiled.tree));

    Ok(())
}

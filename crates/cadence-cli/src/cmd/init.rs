//! `cad init` — create the tracker database.

use crate::output::{render_success, OutputMode};
use cadence_core::Store;
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run_init(_args: &InitArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    // Opening runs the schema migrations; re-running against an existing
    // database is harmless.
    Store::open(db)?;
    render_success(output, &format!("Initialized database at {}", db.display()))?;
    Ok(())
}

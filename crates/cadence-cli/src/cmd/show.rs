//! `cad show` — one work item with its status history.

use crate::output::{ok_or_render, pretty_kv, pretty_section, render, OutputMode};
use cadence_core::{HistoryEvent, Store};
use clap::Args;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Work item ID.
    pub id: String,
}

pub fn run_show(args: &ShowArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let item = ok_or_render(output, store.get_item(&args.id))?;

    render(output, &item, |it, w| {
        pretty_kv(w, "id", &it.id)?;
        pretty_kv(w, "project", &it.project_id)?;
        pretty_kv(w, "title", &it.title)?;
        pretty_kv(w, "status", it.status.as_str())?;
        if let Some(sprint) = &it.sprint_id {
            pretty_kv(w, "sprint", sprint)?;
        }
        if let Some(points) = it.points {
            pretty_kv(w, "points", format!("{points}"))?;
        }
        writeln!(w)?;
        pretty_section(w, "history")?;
        for event in &it.history {
            match event {
                HistoryEvent::Status { status, at } => {
                    writeln!(w, "  {}  {}", at.to_rfc3339(), status.as_str())?;
                }
                HistoryEvent::AddedToSprint { sprint_id, at, .. } => {
                    writeln!(w, "  {}  joined sprint {sprint_id}", at.to_rfc3339())?;
                }
                HistoryEvent::RemovedFromSprint { at } => {
                    writeln!(w, "  {}  left sprint", at.to_rfc3339())?;
                }
            }
        }
        Ok(())
    })
}

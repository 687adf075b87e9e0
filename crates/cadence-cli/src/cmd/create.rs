//! `cad create` — create a new work item.

use crate::output::{ok_or_render, pretty_kv, render, OutputMode};
use cadence_core::{Engine, Store, SystemClock};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project the item belongs to.
    #[arg(short, long)]
    pub project: String,

    /// Title of the new item.
    #[arg(short, long)]
    pub title: String,

    /// Description text.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Point estimate.
    #[arg(long)]
    pub points: Option<f64>,

    /// Assign the item to a sprint on creation.
    #[arg(long)]
    pub sprint: Option<String>,
}

pub fn run_create(args: &CreateArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let clock = SystemClock;
    let engine = Engine::new(&store, &clock);

    let mut item = ok_or_render(output, engine.create_item(&args.project, &args.title))?;

    if args.description.is_some() || args.points.is_some() {
        item.description.clone_from(&args.description);
        item.points = args.points;
        ok_or_render(output, store.put_item(&item))?;
    }
    if let Some(sprint) = &args.sprint {
        item = ok_or_render(output, engine.change_sprint(&item.id, Some(sprint)))?;
    }

    render(output, &item, |it, w| {
        pretty_kv(w, "id", &it.id)?;
        pretty_kv(w, "title", &it.title)?;
        pretty_kv(w, "status", it.status.as_str())
    })
}

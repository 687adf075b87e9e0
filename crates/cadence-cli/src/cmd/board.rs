//! `cad board` — board views, cards, and drift reconciliation.

use crate::output::{ok_or_render, pretty_section, render, render_success, OutputMode};
use cadence_core::{BoardCard, BoardColumn, Engine, Store, SystemClock};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    #[command(
        about = "Show the board, grouped by column",
        after_help = "EXAMPLES:\n    cad board show --project web"
    )]
    Show(ShowArgs),

    #[command(
        about = "Re-derive card statuses from their linked items",
        after_help = "EXAMPLES:\n    cad board reconcile --project web"
    )]
    Reconcile(ReconcileArgs),

    #[command(
        about = "Add a card, optionally linked to a work item",
        after_help = "EXAMPLES:\n    # A free-floating note card\n    cad board add --project web --title \"Spike: caching\" --status todo\n\n    # Linked to an item (todo/doing/done echo to the item)\n    cad board add --project web --title \"Fix login\" --status doing --item <ITEM_ID>"
    )]
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Project whose board to show.
    #[arg(short, long)]
    pub project: String,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Project whose board to reconcile.
    #[arg(short, long)]
    pub project: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Project the card belongs to.
    #[arg(short, long)]
    pub project: String,

    /// Card title.
    #[arg(short, long)]
    pub title: String,

    /// Column status for the card.
    #[arg(short, long, default_value = "todo")]
    pub status: String,

    /// Link the card to a work item.
    #[arg(long)]
    pub item: Option<String>,
}

/// Board view payload: normalized columns plus cards in render order.
#[derive(Debug, Serialize)]
struct BoardView {
    columns: Vec<BoardColumn>,
    cards: Vec<BoardCard>,
}

pub fn run_board(command: &BoardCommand, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let clock = SystemClock;
    let engine = Engine::new(&store, &clock);

    match command {
        BoardCommand::Show(args) => {
            let columns = ok_or_render(output, engine.normalized_board_columns(&args.project))?;
            let cards = ok_or_render(output, store.cards_for_project(&args.project))?;
            let view = BoardView { columns, cards };
            render(output, &view, |v, w| {
                for column in &v.columns {
                    pretty_section(w, &column.title)?;
                    for card in v.cards.iter().filter(|c| c.status == column.id) {
                        let link = card
                            .item_id
                            .as_deref()
                            .map_or_else(String::new, |id| format!("  [{id}]"));
                        writeln!(w, "  {}{link}", card.title)?;
                    }
                    writeln!(w)?;
                }
                Ok(())
            })
        }
        BoardCommand::Reconcile(args) => {
            let cards = ok_or_render(output, engine.reconcile_board(&args.project))?;
            render_success(
                output,
                &format!("board reconciled ({} cards checked)", cards.len()),
            )?;
            Ok(())
        }
        BoardCommand::Add(args) => {
            let card = ok_or_render(
                output,
                engine.add_card(
                    &args.project,
                    &args.title,
                    &args.status,
                    args.item.as_deref(),
                ),
            )?;
            render_success(
                output,
                &format!("added card {} in column {}", card.id, card.status),
            )?;
            Ok(())
        }
    }
}

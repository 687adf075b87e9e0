//! `cad estimate` — planning-poker consensus from a round of votes.

use crate::output::{ok_or_render, render, render_error, render_success, CliError, OutputMode};
use cadence_core::{Engine, Store, SystemClock};
use cadence_metrics::{is_numeric_vote, suggest, DECK};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Votes from the round: deck cards, including "?" and the coffee card.
    #[arg(required = true)]
    pub votes: Vec<String>,

    /// Apply the suggestion as the item's point estimate.
    #[arg(long, value_name = "ITEM_ID")]
    pub apply: Option<String>,
}

#[derive(Debug, Serialize)]
struct Suggestion {
    suggestion: f64,
    counted_votes: usize,
    total_votes: usize,
}

pub fn run_estimate(args: &EstimateArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let counted = args
        .votes
        .iter()
        .filter(|v| is_numeric_vote(v))
        .count();

    let Some(value) = suggest(args.votes.iter().map(String::as_str)) else {
        render_error(
            output,
            &CliError::with_details(
                "no numeric votes in this round",
                format!("Deck cards: {}", DECK.join(" ")),
                "E2004",
            ),
        )?;
        anyhow::bail!("no numeric votes");
    };

    if let Some(item_id) = &args.apply {
        let store = Store::open(db)?;
        let clock = SystemClock;
        let engine = Engine::new(&store, &clock);
        let item = ok_or_render(output, engine.set_points(item_id, value))?;
        render_success(output, &format!("{} estimated at {value}", item.id))?;
        return Ok(());
    }

    let result = Suggestion {
        suggestion: value,
        counted_votes: counted,
        total_votes: args.votes.len(),
    };
    render(output, &result, |r, w| {
        writeln!(
            w,
            "suggest {} ({} of {} votes counted)",
            r.suggestion, r.counted_votes, r.total_votes
        )
    })
}

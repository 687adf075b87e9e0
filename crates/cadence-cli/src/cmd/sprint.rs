//! `cad sprint` — sprint lifecycle and KPI reports.

use crate::output::{ok_or_render, pretty_kv, pretty_section, render, render_success, OutputMode};
use cadence_core::{Engine, Store, SystemClock};
use cadence_metrics::{compute_sprint_metrics, DEFAULT_TARGET_DAYS};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum SprintCommand {
    #[command(
        about = "Create a new active sprint",
        after_help = "EXAMPLES:\n    cad sprint new --project web --name \"Sprint 12\""
    )]
    New(NewArgs),

    #[command(
        about = "Assign an item to a sprint (or remove it)",
        after_help = "EXAMPLES:\n    # Assign\n    cad sprint assign <ITEM_ID> <SPRINT_ID>\n\n    # Remove from its sprint\n    cad sprint assign <ITEM_ID> --none"
    )]
    Assign(AssignArgs),

    #[command(
        about = "Complete a sprint, freezing its metrics reference time",
        after_help = "EXAMPLES:\n    cad sprint complete <SPRINT_ID>"
    )]
    Complete(CompleteArgs),

    #[command(
        about = "KPI rollup: progress, velocity, and lead-time aggregates",
        after_help = "EXAMPLES:\n    # Report with the default 7-day lead target\n    cad sprint report <SPRINT_ID>\n\n    # Machine-readable\n    cad sprint report <SPRINT_ID> --json"
    )]
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Project the sprint belongs to.
    #[arg(short, long)]
    pub project: String,

    /// Sprint name.
    #[arg(short, long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Work item ID.
    pub item: String,

    /// Target sprint ID.
    #[arg(required_unless_present = "none")]
    pub sprint: Option<String>,

    /// Remove the item from its current sprint.
    #[arg(long, conflicts_with = "sprint")]
    pub none: bool,
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Sprint ID.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Sprint ID.
    pub id: String,

    /// Target lead time in days.
    #[arg(long, default_value_t = DEFAULT_TARGET_DAYS)]
    pub target: f64,
}

pub fn run_sprint(command: &SprintCommand, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let clock = SystemClock;
    let engine = Engine::new(&store, &clock);

    match command {
        SprintCommand::New(args) => {
            let sprint = ok_or_render(output, engine.create_sprint(&args.project, &args.name))?;
            render(output, &sprint, |s, w| {
                pretty_kv(w, "id", &s.id)?;
                pretty_kv(w, "name", &s.name)?;
                pretty_kv(w, "status", s.status.as_str())
            })
        }
        SprintCommand::Assign(args) => {
            let target = if args.none { None } else { args.sprint.as_deref() };
            let item = ok_or_render(output, engine.change_sprint(&args.item, target))?;
            let message = match &item.sprint_id {
                Some(sprint) => format!("{} assigned to sprint {sprint}", item.id),
                None => format!("{} removed from its sprint", item.id),
            };
            render_success(output, &message)?;
            Ok(())
        }
        SprintCommand::Complete(args) => {
            let sprint = ok_or_render(output, engine.complete_sprint(&args.id))?;
            let stamp = sprint
                .completed_at
                .map_or_else(String::new, |at| at.to_rfc3339());
            render_success(output, &format!("{} completed at {stamp}", sprint.id))?;
            Ok(())
        }
        SprintCommand::Report(args) => {
            let (sprint, items) = ok_or_render(output, engine.sprint_detail(&args.id))?;
            let metrics = compute_sprint_metrics(&sprint, &items, args.target, &clock);
            render(output, &metrics, |m, w| {
                pretty_section(w, &format!("sprint {}", sprint.name))?;
                pretty_kv(
                    w,
                    "stories",
                    format!("{}/{} done ({}%)", m.done_stories, m.total_stories, m.progress_pct),
                )?;
                pretty_kv(
                    w,
                    "points",
                    format!("{}/{} completed", m.completed_points, m.total_points),
                )?;
                pretty_kv(w, "velocity", format!("{}", m.velocity))?;
                writeln!(w)?;
                pretty_kv(w, "avg lead", format!("{} d", m.avg_lead_days))?;
                pretty_kv(
                    w,
                    "within target",
                    format!("{} items ({}%)", m.lead_within_target, m.lead_within_target_pct),
                )
            })
        }
    }
}

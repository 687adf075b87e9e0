#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cadence: workflow state-history and lead-time analytics",
    long_about = None
)]
struct Cli {
    /// Path to the tracker database.
    #[arg(long, global = true, env = "CADENCE_DB", default_value = "cadence.db")]
    db: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, env, and TTY detection.
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Initialize a tracker database",
        long_about = "Create the tracker database and run schema migrations.",
        after_help = "EXAMPLES:\n    # Create ./cadence.db\n    cad init\n\n    # Create a database at an explicit path\n    cad --db /tmp/team.db init"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a new work item",
        long_about = "Create a work item in the todo status with a seeded history entry.",
        after_help = "EXAMPLES:\n    # Create a story\n    cad create --project web --title \"Fix login timeout\"\n\n    # Create with an estimate and sprint assignment\n    cad create --project web --title \"Launch v2\" --points 8 --sprint <SPRINT_ID>"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one work item with its status history",
        after_help = "EXAMPLES:\n    # Show an item\n    cad show <ITEM_ID>\n\n    # Emit machine-readable output\n    cad show <ITEM_ID> --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        name = "move",
        next_help_heading = "Lifecycle",
        about = "Move a work item to a new status",
        long_about = "Transition a work item through the workflow. Repeating the \
                      current status is a no-op and appends nothing.",
        after_help = "EXAMPLES:\n    # Start work\n    cad move <ITEM_ID> doing\n\n    # Hyphen spelling is accepted\n    cad move <ITEM_ID> awaiting-deploy"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Read",
        about = "Lead-time report for one work item",
        long_about = "Per-status dwell times, total lead time, and variance against \
                      the target, derived from the item's status history.",
        after_help = "EXAMPLES:\n    # Report against the default 7-day target\n    cad lead <ITEM_ID>\n\n    # Custom target\n    cad lead <ITEM_ID> --target 10"
    )]
    Lead(cmd::lead::LeadArgs),

    #[command(
        next_help_heading = "Planning",
        about = "Manage sprints and sprint reports",
        subcommand
    )]
    Sprint(cmd::sprint::SprintCommand),

    #[command(
        next_help_heading = "Board",
        about = "Inspect and reconcile the project board",
        subcommand
    )]
    Board(cmd::board::BoardCommand),

    #[command(
        next_help_heading = "Planning",
        about = "Suggest a consensus estimate from planning votes",
        long_about = "Filter non-numeric votes, average the rest, and snap to the \
                      nearest card in the planning deck (ties go to the smaller card).",
        after_help = "EXAMPLES:\n    # Suggest from a round of votes\n    cad estimate 3 5 5 8\n\n    # Apply the suggestion to an item\n    cad estimate 3 5 5 8 --apply <ITEM_ID>"
    )]
    Estimate(cmd::estimate::EstimateArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CADENCE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "cadence=debug,info"
        } else {
            "cadence=info,warn"
        })
    });

    let format = env::var("CADENCE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mode = cli.output_mode();
    let db = cli.db.as_path();
    debug!(db = %db.display(), "resolved database path");

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, db, mode),
        Commands::Create(args) => cmd::create::run_create(args, db, mode),
        Commands::Show(args) => cmd::show::run_show(args, db, mode),
        Commands::Move(args) => cmd::move_cmd::run_move(args, db, mode),
        Commands::Lead(args) => cmd::lead::run_lead(args, db, mode),
        Commands::Sprint(command) => cmd::sprint::run_sprint(command, db, mode),
        Commands::Board(command) => cmd::board::run_board(command, db, mode),
        Commands::Estimate(args) => cmd::estimate::run_estimate(args, db, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_flags_anywhere() {
        let cli = Cli::parse_from(["cad", "show", "abc", "--json", "--db", "/tmp/x.db"]);
        assert!(cli.json);
        assert_eq!(cli.db, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

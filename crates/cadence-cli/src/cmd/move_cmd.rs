//! `cad move` — transition a work item through the workflow.

use crate::output::{ok_or_render, render_success, OutputMode};
use cadence_core::{Engine, Store, SystemClock};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Work item ID.
    pub id: String,

    /// Target status (todo, doing, testing, awaiting-deploy, deployed, done).
    pub status: String,
}

pub fn run_move(args: &MoveArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let clock = SystemClock;
    let engine = Engine::new(&store, &clock);

    let item = ok_or_render(output, engine.transition(&args.id, &args.status))?;
    render_success(
        output,
        &format!("{} is now {}", item.id, item.status.as_str()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_args_positional_order() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: MoveArgs,
        }
        let w = Wrapper::parse_from(["test", "it-1", "doing"]);
        assert_eq!(w.args.id, "it-1");
        assert_eq!(w.args.status, "doing");
    }
}

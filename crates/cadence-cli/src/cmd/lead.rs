//! `cad lead` — lead-time report for one work item.

use crate::output::{ok_or_render, pretty_kv, render, render_error, CliError, OutputMode};
use cadence_core::{Error, Status, Store, SystemClock};
use cadence_metrics::{compute_lead_time, DEFAULT_TARGET_DAYS};
use clap::Args;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct LeadArgs {
    /// Work item ID.
    pub id: String,

    /// Target lead time in days.
    #[arg(long, default_value_t = DEFAULT_TARGET_DAYS)]
    pub target: f64,
}

pub fn run_lead(args: &LeadArgs, db: &Path, output: OutputMode) -> anyhow::Result<()> {
    let store = Store::open(db)?;
    let clock = SystemClock;

    let item = ok_or_render(output, store.get_item(&args.id))?;
    let Some(sprint_id) = &item.sprint_id else {
        let err = Error::InvalidInput("item is not assigned to a sprint");
        render_error(output, &CliError::from(&err))?;
        anyhow::bail!("{err}");
    };
    let sprint = ok_or_render(output, store.get_sprint(sprint_id))?;

    let Some(report) = compute_lead_time(&item.history, &sprint, args.target, &clock) else {
        render_error(output, &CliError::new("no history data for this item"))?;
        anyhow::bail!("no history data");
    };

    render(output, &report, |r, w| {
        for status in Status::ALL {
            let days = r.per_status_days.get(&status).copied().unwrap_or(0.0);
            pretty_kv(w, status.as_str(), format!("{days} d"))?;
        }
        writeln!(w)?;
        pretty_kv(w, "total", format!("{} d", r.total_days))?;
        pretty_kv(
            w,
            "variance",
            format!("{:+} d vs {} d target", r.variance_days, args.target),
        )?;
        pretty_kv(w, "within target", if r.within_target { "yes" } else { "no" })
    })
}

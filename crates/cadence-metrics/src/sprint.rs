//! Sprint-level KPI rollup.
//!
//! Composes per-item lead times into sprint aggregates: progress, velocity,
//! average lead days, and the share of items finishing within target. Items
//! without history are excluded from lead-time aggregates rather than
//! counted as zero; they still count toward story and point totals. All
//! divisions are guarded so an empty sprint reports zeros, never NaN.

use cadence_core::clock::Clock;
use cadence_core::model::item::{Status, WorkItem};
use cadence_core::model::sprint::Sprint;
use serde::Serialize;
use tracing::debug;

use crate::leadtime::compute_lead_time;

/// Derived sprint KPIs. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintMetrics {
    pub total_stories: usize,
    pub done_stories: usize,
    /// Done stories over total, as a percentage rounded to 1 decimal.
    pub progress_pct: f64,
    /// Sum of defined point estimates; missing estimates contribute 0.
    pub total_points: f64,
    /// Points on `done` stories.
    pub completed_points: f64,
    /// Alias of `completed_points`, kept as its own field so callers asking
    /// for velocity read as asking for velocity.
    pub velocity: f64,
    /// Mean total lead days across items with history, rounded to 2
    /// decimals; 0 when no item qualifies.
    pub avg_lead_days: f64,
    /// Items with history finishing within the target.
    pub lead_within_target: usize,
    /// `lead_within_target` over qualifying items, as a percentage rounded
    /// to 1 decimal; 0 when no item qualifies.
    pub lead_within_target_pct: f64,
}

/// Roll up sprint KPIs from the sprint's items.
///
/// Per-item problems degrade only that item: an empty or malformed history
/// drops the item from lead-time aggregates while it still counts toward
/// story and point totals.
#[must_use]
pub fn compute_sprint_metrics(
    sprint: &Sprint,
    items: &[WorkItem],
    target_days: f64,
    clock: &dyn Clock,
) -> SprintMetrics {
    let total_stories = items.len();
    let done_stories = items.iter().filter(|it| it.status == Status::Done).count();
    let total_points: f64 = items.iter().filter_map(|it| it.points).sum();
    let completed_points: f64 = items
        .iter()
        .filter(|it| it.status == Status::Done)
        .filter_map(|it| it.points)
        .sum();

    let mut lead_days = Vec::new();
    let mut lead_within_target = 0usize;
    for item in items {
        let Some(lead) = compute_lead_time(&item.history, sprint, target_days, clock) else {
            debug!(item = %item.id, "no history; excluded from lead-time aggregates");
            continue;
        };
        lead_days.push(lead.total_days);
        if lead.within_target {
            lead_within_target += 1;
        }
    }

    let progress_pct = round1(percentage(done_stories, total_stories));
    let avg_lead_days = if lead_days.is_empty() {
        0.0
    } else {
        round2(lead_days.iter().sum::<f64>() / usize_to_f64(lead_days.len()))
    };
    let lead_within_target_pct = round1(percentage(lead_within_target, lead_days.len()));

    SprintMetrics {
        total_stories,
        done_stories,
        progress_pct,
        total_points,
        completed_points,
        velocity: completed_points,
        avg_lead_days,
        lead_within_target,
        lead_within_target_pct,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        usize_to_f64(part) / usize_to_f64(whole) * 100.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

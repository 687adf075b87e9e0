//! Per-item lead-time computation.
//!
//! Walks one item's history and accumulates time spent in each status, plus
//! the total lead time from the first event to the first `done` event (or to
//! the sprint's reference "now" while the item is still open). Durations
//! accumulate in milliseconds and are converted to days, rounded to two
//! decimals, exactly once at the output boundary — never per interval, so
//! rounding error cannot compound.

use std::collections::BTreeMap;

use cadence_core::clock::Clock;
use cadence_core::history::{History, HistoryEvent};
use cadence_core::model::item::Status;
use cadence_core::model::sprint::Sprint;
use serde::Serialize;

/// Default lead-time target, in days.
pub const DEFAULT_TARGET_DAYS: f64 = 7.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Derived lead-time figures for one work item. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadTimeResult {
    /// Days spent in each status, rounded to 2 decimals. Every one of the
    /// six statuses is present, zero-filled when never visited, so
    /// downstream rendering is stable.
    pub per_status_days: BTreeMap<Status, f64>,
    /// Total lead time in days, rounded to 2 decimals. Measured from the
    /// first history event to the first `done` event; re-opening and
    /// re-finishing later does not extend it.
    pub total_days: f64,
    /// Signed variance against the target, in days. Negative means ahead
    /// of target; never clamped.
    pub variance_days: f64,
    /// True when total lead time is within the target.
    pub within_target: bool,
}

/// Compute lead time for one item's history.
///
/// Returns `None` when the history is empty — the caller must surface "no
/// data" rather than a spurious zero duration.
///
/// Open intervals end at the sprint's reference "now": the completion stamp
/// for a completed sprint, else the injected clock. Membership markers do
/// not accumulate time but still bound the neighboring status interval.
/// Inverted timestamps (clock skew between writers) clamp to zero.
#[must_use]
pub fn compute_lead_time(
    history: &History,
    sprint: &Sprint,
    target_days: f64,
    clock: &dyn Clock,
) -> Option<LeadTimeResult> {
    if history.is_empty() {
        return None;
    }

    let events = history.sorted_by_time();
    let reference_now = sprint.reference_now(clock.now());

    let mut per_status_ms: BTreeMap<Status, i64> =
        Status::ALL.iter().map(|&status| (status, 0)).collect();

    for (index, event) in events.iter().enumerate() {
        let Some(status) = event.status() else {
            continue;
        };
        let end = events
            .get(index + 1)
            .map_or(reference_now, HistoryEvent::at);
        let elapsed_ms = (end - event.at()).num_milliseconds().max(0);
        if let Some(bucket) = per_status_ms.get_mut(&status) {
            *bucket += elapsed_ms;
        }
    }

    let started_at = events[0].at();
    let finished_at = events
        .iter()
        .find(|event| event.status() == Some(Status::Done))
        .map_or(reference_now, |event| event.at());
    let total_ms = (finished_at - started_at).num_milliseconds().max(0);

    let total_days_exact = to_days(total_ms);
    Some(LeadTimeResult {
        per_status_days: per_status_ms
            .into_iter()
            .map(|(status, ms)| (status, round2(to_days(ms))))
            .collect(),
        total_days: round2(total_days_exact),
        variance_days: round2(total_days_exact - target_days),
        within_target: total_days_exact <= target_days,
    })
}

#[allow(clippy::cast_precision_loss)]
fn to_days(ms: i64) -> f64 {
    ms as f64 / MS_PER_DAY
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

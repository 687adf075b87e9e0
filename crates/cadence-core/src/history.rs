//! The append-only status-history log.
//!
//! Every status transition and sprint-membership change on a work item is
//! recorded as an immutable timestamped event. The log is the durable source
//! of truth for all derived metrics and is persisted verbatim (one JSON
//! record per event, in the original document shape).
//!
//! Two kinds of event share one chronological sequence:
//!
//! - status events: `{"status": ..., "at": ...}`
//! - sprint-membership markers: `{"event": "added-to-sprint", ...}` /
//!   `{"event": "removed-from-sprint", "at": ...}`
//!
//! Membership markers never accumulate time-in-status themselves, but they
//! stay interleaved with status events so they bound the neighboring status
//! interval and mark sprint boundaries for the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::item::Status;

/// One entry in a work item's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub enum HistoryEvent {
    /// The item entered `status` at `at`.
    Status { status: Status, at: DateTime<Utc> },
    /// The item joined a sprint; `status` snapshots the item's status at
    /// the moment of entry.
    AddedToSprint {
        sprint_id: String,
        status: Status,
        at: DateTime<Utc>,
    },
    /// The item left its sprint (back to the backlog).
    RemovedFromSprint { at: DateTime<Utc> },
}

impl HistoryEvent {
    /// Timestamp of this event.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Status { at, .. }
            | Self::AddedToSprint { at, .. }
            | Self::RemovedFromSprint { at } => *at,
        }
    }

    /// The status this event carries, if it is status-bearing.
    ///
    /// Membership markers return `None` even though `AddedToSprint` snapshots
    /// a status field — that snapshot is audit data, not a transition, and
    /// must not open a new time-in-status interval.
    #[must_use]
    pub const fn status(&self) -> Option<Status> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::AddedToSprint { .. } | Self::RemovedFromSprint { .. } => None,
        }
    }
}

/// Persisted wire shape shared by all three event kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sprint_id: Option<String>,
    at: DateTime<Utc>,
}

impl TryFrom<RawEvent> for HistoryEvent {
    type Error = String;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        match raw.event.as_deref() {
            None => {
                let status = raw
                    .status
                    .ok_or_else(|| "history entry missing status".to_string())?;
                Ok(Self::Status { status, at: raw.at })
            }
            Some("added-to-sprint") => {
                let sprint_id = raw
                    .sprint_id
                    .ok_or_else(|| "added-to-sprint entry missing sprintId".to_string())?;
                let status = raw
                    .status
                    .ok_or_else(|| "added-to-sprint entry missing status".to_string())?;
                Ok(Self::AddedToSprint {
                    sprint_id,
                    status,
                    at: raw.at,
                })
            }
            Some("removed-from-sprint") => Ok(Self::RemovedFromSprint { at: raw.at }),
            Some(other) => Err(format!("unknown history event '{other}'")),
        }
    }
}

impl From<HistoryEvent> for RawEvent {
    fn from(event: HistoryEvent) -> Self {
        match event {
            HistoryEvent::Status { status, at } => Self {
                event: None,
                status: Some(status),
                sprint_id: None,
                at,
            },
            HistoryEvent::AddedToSprint {
                sprint_id,
                status,
                at,
            } => Self {
                event: Some("added-to-sprint".to_string()),
                status: Some(status),
                sprint_id: Some(sprint_id),
                at,
            },
            HistoryEvent::RemovedFromSprint { at } => Self {
                event: Some("removed-from-sprint".to_string()),
                status: None,
                sprint_id: None,
                at,
            },
        }
    }
}

/// An item's ordered event log.
///
/// Append-only: entries are added with the caller's "now" and the sequence
/// stays non-decreasing by timestamp as long as appends use a monotonic
/// clock. Concurrent writers racing on the same item can interleave
/// timestamps out of order (last-write-wins storage, an accepted limitation),
/// so readers that depend on order sort defensively instead of trusting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<HistoryEvent>);

impl History {
    /// Append an event.
    pub fn push(&mut self, event: HistoryEvent) {
        self.0.push(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEvent> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[HistoryEvent] {
        &self.0
    }

    /// First event, if any.
    #[must_use]
    pub fn first(&self) -> Option<&HistoryEvent> {
        self.0.first()
    }

    /// Status of the last status-bearing entry.
    #[must_use]
    pub fn last_status(&self) -> Option<Status> {
        self.0.iter().rev().find_map(HistoryEvent::status)
    }

    /// Timestamp of the first `done` status event. Lead time is measured up
    /// to this point even if the item later reopens and finishes again.
    #[must_use]
    pub fn first_done_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .iter()
            .find(|e| e.status() == Some(Status::Done))
            .map(HistoryEvent::at)
    }

    /// True when entries are non-decreasing by timestamp.
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0].at() <= pair[1].at())
    }

    /// A copy of the entries sorted by timestamp (stable, so same-instant
    /// entries keep their append order). Calculators walk this instead of
    /// the raw sequence to tolerate racy out-of-order appends.
    #[must_use]
    pub fn sorted_by_time(&self) -> Vec<HistoryEvent> {
        let mut events = self.0.clone();
        events.sort_by_key(HistoryEvent::at);
        events
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEvent;
    type IntoIter = std::slice::Iter<'a, HistoryEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<HistoryEvent>> for History {
    fn from(events: Vec<HistoryEvent>) -> Self {
        Self(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).single().expect("ts")
    }

    fn status_event(status: Status, hour: u32) -> HistoryEvent {
        HistoryEvent::Status { status, at: ts(hour) }
    }

    #[test]
    fn status_event_json_shape() {
        let event = status_event(Status::Doing, 9);
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["status"], "doing");
        assert!(json.get("event").is_none());
        assert!(json.get("sprintId").is_none());

        let back: HistoryEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn membership_event_json_shape() {
        let added = HistoryEvent::AddedToSprint {
            sprint_id: "spr-1".into(),
            status: Status::Todo,
            at: ts(9),
        };
        let json = serde_json::to_value(&added).expect("serialize");
        assert_eq!(json["event"], "added-to-sprint");
        assert_eq!(json["sprintId"], "spr-1");
        assert_eq!(json["status"], "todo");

        let removed = HistoryEvent::RemovedFromSprint { at: ts(10) };
        let json = serde_json::to_value(&removed).expect("serialize");
        assert_eq!(json["event"], "removed-from-sprint");
        assert!(json.get("status").is_none());

        let back: HistoryEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, removed);
    }

    #[test]
    fn deserialize_rejects_malformed_entries() {
        assert!(serde_json::from_str::<HistoryEvent>(r#"{"at":"2026-05-04T09:00:00Z"}"#).is_err());
        assert!(serde_json::from_str::<HistoryEvent>(
            r#"{"event":"renamed","at":"2026-05-04T09:00:00Z"}"#
        )
        .is_err());
        assert!(serde_json::from_str::<HistoryEvent>(
            r#"{"event":"added-to-sprint","at":"2026-05-04T09:00:00Z"}"#
        )
        .is_err());
    }

    #[test]
    fn membership_markers_are_not_status_bearing() {
        let added = HistoryEvent::AddedToSprint {
            sprint_id: "spr-1".into(),
            status: Status::Doing,
            at: ts(9),
        };
        assert_eq!(added.status(), None);
        assert_eq!(status_event(Status::Doing, 9).status(), Some(Status::Doing));
    }

    #[test]
    fn last_status_skips_membership_markers() {
        let history: History = vec![
            status_event(Status::Todo, 8),
            status_event(Status::Doing, 9),
            HistoryEvent::RemovedFromSprint { at: ts(10) },
        ]
        .into();
        assert_eq!(history.last_status(), Some(Status::Doing));
    }

    #[test]
    fn first_done_wins_over_a_later_re_close() {
        let history: History = vec![
            status_event(Status::Todo, 8),
            status_event(Status::Done, 10),
            status_event(Status::Doing, 12),
            status_event(Status::Done, 15),
        ]
        .into();
        assert_eq!(history.first_done_at(), Some(ts(10)));
    }

    #[test]
    fn chronological_check_and_defensive_sort() {
        let ordered: History = vec![status_event(Status::Todo, 8), status_event(Status::Doing, 9)].into();
        assert!(ordered.is_chronological());

        let racy: History = vec![status_event(Status::Doing, 9), status_event(Status::Todo, 8)].into();
        assert!(!racy.is_chronological());

        let sorted = racy.sorted_by_time();
        assert_eq!(sorted[0].at(), ts(8));
        assert_eq!(sorted[1].at(), ts(9));
    }

    #[test]
    fn history_serializes_as_a_bare_array() {
        let history: History = vec![status_event(Status::Todo, 8)].into();
        let json = serde_json::to_string(&history).expect("serialize");
        assert!(json.starts_with('['));

        let back: History = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, history);
    }
}

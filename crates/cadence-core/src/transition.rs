//! The work-item state machine.
//!
//! Applies status transitions and sprint-membership changes to a work item,
//! keeping the canonical `status` field and the history log in step. Any
//! status may move to any other status — the six values are ordered for the
//! board, not gated (a rollback like `deployed -> doing` is a normal move).
//! Validation of raw status strings happens at the boundary via
//! `Status::from_str`; by the time a [`Status`] reaches this module it is
//! already legal.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::history::HistoryEvent;
use crate::model::item::{Status, WorkItem};

/// Outcome of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The target status equals the current status; nothing changed.
    Noop,
    /// The transition was applied. `board_echo` carries the status a linked
    /// board card should be rewritten to, when the bridging contract with
    /// the board fires (item is in a sprint and the status is one of the
    /// original three board columns).
    Applied { board_echo: Option<Status> },
}

/// Apply a status transition at `now`.
///
/// Setting the same status again is a no-op: no duplicate history entry is
/// appended. Items created before history tracking existed (empty history,
/// still in `todo`) get a retroactive `todo` entry at their creation
/// timestamp before the new status is recorded, so the log always starts at
/// the true beginning of the item's life.
pub fn transition(item: &mut WorkItem, new_status: Status, now: DateTime<Utc>) -> Transition {
    if new_status == item.status {
        return Transition::Noop;
    }

    if item.history.is_empty() && item.status == Status::Todo {
        item.history.push(HistoryEvent::Status {
            status: Status::Todo,
            at: item.created_at,
        });
    }

    item.history.push(HistoryEvent::Status {
        status: new_status,
        at: now,
    });
    let previous = item.status;
    item.status = new_status;

    debug!(item = %item.id, from = %previous, to = %new_status, "status transition");

    let board_echo = (item.sprint_id.is_some() && new_status.echoes_to_board())
        .then_some(new_status);
    Transition::Applied { board_echo }
}

/// Change sprint membership at `now`.
///
/// Records an `added-to-sprint` marker (snapshotting the current status)
/// when moving into a different sprint, or a `removed-from-sprint` marker
/// when moving back to the backlog. The canonical status never changes here.
/// Returns `true` when membership actually changed.
pub fn change_sprint(
    item: &mut WorkItem,
    new_sprint_id: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    if item.sprint_id.as_deref() == new_sprint_id {
        return false;
    }

    match new_sprint_id {
        Some(sprint_id) => {
            item.history.push(HistoryEvent::AddedToSprint {
                sprint_id: sprint_id.to_string(),
                status: item.status,
                at: now,
            });
            item.sprint_id = Some(sprint_id.to_string());
        }
        None => {
            // Only meaningful when the item actually was in a sprint, which
            // the equality check above guarantees.
            item.history.push(HistoryEvent::RemovedFromSprint { at: now });
            item.sprint_id = None;
        }
    }

    debug!(item = %item.id, sprint = ?item.sprint_id, "sprint membership changed");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use crate::model::item::WorkItem;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).single().expect("ts")
    }

    fn item() -> WorkItem {
        WorkItem::new("proj-1", "Story", ts(1, 9))
    }

    #[test]
    fn noop_transition_leaves_item_untouched() {
        let mut it = item();
        let before = it.clone();
        assert_eq!(transition(&mut it, Status::Todo, ts(1, 10)), Transition::Noop);
        assert_eq!(it, before);
    }

    #[test]
    fn transition_appends_and_updates_status() {
        let mut it = item();
        let outcome = transition(&mut it, Status::Doing, ts(1, 10));
        assert_eq!(outcome, Transition::Applied { board_echo: None });
        assert_eq!(it.status, Status::Doing);
        assert_eq!(it.history.len(), 2);
        assert_eq!(it.history.last_status(), Some(Status::Doing));
        assert!(it.history.is_chronological());
    }

    #[test]
    fn retroactive_todo_is_seeded_for_pre_tracking_items() {
        let mut it = item();
        it.history = History::default(); // created before history tracking

        transition(&mut it, Status::Doing, ts(2, 10));

        let events = it.history.sorted_by_time();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status(), Some(Status::Todo));
        assert_eq!(events[0].at(), it.created_at);
        assert_eq!(events[1].status(), Some(Status::Doing));
        assert_eq!(events[1].at(), ts(2, 10));
    }

    #[test]
    fn no_retroactive_seed_when_item_left_todo_already() {
        let mut it = item();
        it.history = History::default();
        it.status = Status::Doing; // history lost after the item moved on

        transition(&mut it, Status::Done, ts(2, 10));
        assert_eq!(it.history.len(), 1);
        assert_eq!(it.history.last_status(), Some(Status::Done));
    }

    #[test]
    fn rollback_transitions_are_allowed() {
        let mut it = item();
        transition(&mut it, Status::Deployed, ts(1, 10));
        let outcome = transition(&mut it, Status::Doing, ts(1, 11));
        assert!(matches!(outcome, Transition::Applied { .. }));
        assert_eq!(it.status, Status::Doing);
    }

    #[test]
    fn board_echo_fires_only_in_sprint_and_for_board_columns() {
        let mut it = item();
        it.sprint_id = Some("spr-1".into());

        assert_eq!(
            transition(&mut it, Status::Doing, ts(1, 10)),
            Transition::Applied { board_echo: Some(Status::Doing) }
        );
        assert_eq!(
            transition(&mut it, Status::Testing, ts(1, 11)),
            Transition::Applied { board_echo: None }
        );

        let mut backlog_item = item();
        assert_eq!(
            transition(&mut backlog_item, Status::Done, ts(1, 12)),
            Transition::Applied { board_echo: None }
        );
    }

    #[test]
    fn change_sprint_records_markers_and_keeps_status() {
        let mut it = item();
        transition(&mut it, Status::Doing, ts(1, 10));

        assert!(change_sprint(&mut it, Some("spr-1"), ts(1, 11)));
        assert_eq!(it.sprint_id.as_deref(), Some("spr-1"));
        assert_eq!(it.status, Status::Doing);

        let added = it.history.as_slice().last().expect("entry");
        assert!(matches!(
            added,
            HistoryEvent::AddedToSprint { sprint_id, status: Status::Doing, .. }
                if sprint_id == "spr-1"
        ));

        assert!(change_sprint(&mut it, None, ts(1, 12)));
        assert!(it.sprint_id.is_none());
        assert!(matches!(
            it.history.as_slice().last().expect("entry"),
            HistoryEvent::RemovedFromSprint { .. }
        ));
    }

    #[test]
    fn change_sprint_same_target_is_noop() {
        let mut it = item();
        let before_len = it.history.len();
        assert!(!change_sprint(&mut it, None, ts(1, 11)));

        change_sprint(&mut it, Some("spr-1"), ts(1, 12));
        assert!(!change_sprint(&mut it, Some("spr-1"), ts(1, 13)));
        assert_eq!(it.history.len(), before_len + 1);
    }

    #[test]
    fn markers_interleave_chronologically_with_status_events() {
        let mut it = item();
        change_sprint(&mut it, Some("spr-1"), ts(1, 10));
        transition(&mut it, Status::Doing, ts(1, 11));
        change_sprint(&mut it, None, ts(1, 12));
        transition(&mut it, Status::Done, ts(1, 13));

        assert!(it.history.is_chronological());
        assert_eq!(it.history.len(), 5);
        assert_eq!(it.history.last_status(), Some(Status::Done));
    }
}

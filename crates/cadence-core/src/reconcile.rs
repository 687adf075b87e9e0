//! Read-time board reconciliation.
//!
//! Board cards carry their own status column independent of the work item
//! they link to, so the two can diverge under concurrent edits. Instead of a
//! write-time trigger, every board read runs an idempotent pass that rewrites
//! stale cards from the item's canonical status. Repeated runs converge:
//! with no intervening item writes, the second pass corrects nothing.
//!
//! The same read path normalizes the column set itself — legacy documents may
//! carry a retired `backlog` column or miss newer ones; normalization forces
//! the fixed six-column order and never re-creates dropped legacy columns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::board::{default_columns, BoardCard, BoardColumn};
use crate::model::item::Status;

/// Correct stale linked cards in place; returns how many were rewritten.
///
/// `item_status` maps work-item id to canonical status. Cards with no link,
/// or linked to an id absent from the map, are left alone (free board
/// content or a dangling link — neither is ours to rewrite).
pub fn reconcile_cards(
    cards: &mut [BoardCard],
    item_status: &HashMap<String, Status>,
    now: DateTime<Utc>,
) -> usize {
    let mut corrections = 0;

    for card in cards.iter_mut() {
        let Some(item_id) = card.item_id.as_deref() else {
            continue;
        };
        let Some(&status) = item_status.get(item_id) else {
            continue;
        };

        if card.status != status.as_str() {
            debug!(card = %card.id, item = %item_id, from = %card.status, to = %status,
                   "reconciling stale board card");
            card.status = status.as_str().to_string();
            card.updated_at = now;
            corrections += 1;
        }
    }

    corrections
}

/// Normalize a project's column list to the fixed six-column layout.
///
/// Keeps the first occurrence of each known column (preserving its custom
/// title, if any), drops unknown/legacy ids such as `backlog`, fills in any
/// missing column with its default title, and forces canonical order. The
/// returned flag is true when the result differs from the input, so callers
/// persist only on change.
#[must_use]
pub fn normalize_columns(existing: &[BoardColumn]) -> (Vec<BoardColumn>, bool) {
    let mut kept: HashMap<&'static str, BoardColumn> = HashMap::new();
    for col in existing {
        if let Ok(status) = col.id.parse::<Status>() {
            kept.entry(status.as_str()).or_insert_with(|| BoardColumn {
                id: status.as_str().to_string(),
                title: col.title.clone(),
            });
        }
    }

    let columns: Vec<BoardColumn> = default_columns()
        .into_iter()
        .map(|default| kept.remove(default.id.as_str()).unwrap_or(default))
        .collect();

    let changed = columns.len() != existing.len()
        || columns
            .iter()
            .zip(existing)
            .any(|(a, b)| !a.id.eq_ignore_ascii_case(b.id.trim()));

    (columns, changed)
}

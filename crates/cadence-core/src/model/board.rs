use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::Status;

/// A board column: a column id (the status string) plus a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    pub title: String,
}

/// The fixed column set every project board normalizes to.
#[must_use]
pub fn default_columns() -> Vec<BoardColumn> {
    Status::ALL
        .iter()
        .map(|status| BoardColumn {
            id: status.as_str().to_string(),
            title: status.column_title().to_string(),
        })
        .collect()
}

/// A positional card on the kanban board.
///
/// Cards carry their own `status` (column id) and `order`, independent of any
/// linked work item, so a card can go stale relative to its item. When
/// `item_id` is set the item's status is authoritative; free-standing cards
/// (`item_id == None`) are board content in their own right and are never
/// rewritten by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCard {
    pub id: String,
    pub project_id: String,
    pub title: String,
    /// Column id. Not restricted to [`Status`]: legacy documents may carry
    /// retired columns until normalization drops them.
    pub status: String,
    pub order: i64,
    #[serde(default)]
    pub item_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardCard {
    /// Create a card in the given column, optionally linked to a work item.
    #[must_use]
    pub fn new(
        project_id: &str,
        title: &str,
        status: &str,
        order: i64,
        item_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            title: title.to_string(),
            status: status.to_string(),
            order,
            item_id: item_id.map(ToString::to_string),
            created_at: now,
            updated_at: now,
        }
    }
}

//! Typed CRUD over the SQLite store.
//!
//! `Store` owns a connection and maps rows to the model types. Timestamps
//! are RFC 3339 text; `tags` and `history` round-trip through JSON so the
//! history array is preserved exactly as the engine appended it.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::{Error, Result};
use crate::history::History;
use crate::model::board::{BoardCard, BoardColumn};
use crate::model::item::{Priority, Status, WorkItem};
use crate::model::sprint::{Sprint, SprintStatus};

/// Handle to the store database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) an on-disk store.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or migrating the database fails.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: super::open_database(path)?,
        })
    }

    /// In-memory store for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if migrating the database fails.
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: super::open_in_memory()?,
        })
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Insert or fully rewrite a work item row.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn put_item(&self, item: &WorkItem) -> Result<()> {
        let tags = serde_json::to_string(&item.tags)?;
        let history = serde_json::to_string(&item.history)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO items
                (id, project_id, sprint_id, title, description, assignee_id,
                 priority, points, tags, status, created_at, history)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                item.id,
                item.project_id,
                item.sprint_id,
                item.title,
                item.description,
                item.assignee_id,
                item.priority.as_str(),
                item.points,
                tags,
                item.status.as_str(),
                item.created_at.to_rfc3339(),
                history,
            ],
        )?;
        Ok(())
    }

    /// Fetch one item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] when the id is unknown.
    pub fn get_item(&self, id: &str) -> Result<WorkItem> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                params![id],
                RawItem::from_row,
            )
            .optional()?;

        raw.map_or_else(
            || Err(Error::ItemNotFound { id: id.to_string() }),
            RawItem::into_item,
        )
    }

    /// All items in a sprint.
    ///
    /// Decodes histories leniently: a corrupt history document degrades that
    /// one item to an empty history (logged) instead of failing the whole
    /// read, so a sprint rollup survives a single bad row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or row decoding fails.
    pub fn items_in_sprint(&self, sprint_id: &str) -> Result<Vec<WorkItem>> {
        self.query_items(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE sprint_id = ?1 ORDER BY created_at"),
            sprint_id,
        )
    }

    /// All items in a project, with the same lenient history decoding as
    /// [`Store::items_in_sprint`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query or row decoding fails.
    pub fn items_in_project(&self, project_id: &str) -> Result<Vec<WorkItem>> {
        self.query_items(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE project_id = ?1 ORDER BY created_at"),
            project_id,
        )
    }

    fn query_items(&self, sql: &str, param: &str) -> Result<Vec<WorkItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![param], RawItem::from_row)?;

        let mut items = Vec::new();
        for raw in rows {
            items.push(raw?.into_item_lenient()?);
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // Sprints
    // -----------------------------------------------------------------------

    /// Insert or fully rewrite a sprint row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn put_sprint(&self, sprint: &Sprint) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sprints
                (id, project_id, name, goal, start_date, end_date, completed_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                sprint.id,
                sprint.project_id,
                sprint.name,
                sprint.goal,
                sprint.start_date.to_rfc3339(),
                sprint.end_date.map(|ts| ts.to_rfc3339()),
                sprint.completed_at.map(|ts| ts.to_rfc3339()),
                sprint.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Fetch one sprint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SprintNotFound`] when the id is unknown.
    pub fn get_sprint(&self, id: &str) -> Result<Sprint> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, project_id, name, goal, start_date, end_date, completed_at, status
                 FROM sprints WHERE id = ?1",
                params![id],
                RawSprint::from_row,
            )
            .optional()?;

        raw.map_or_else(
            || Err(Error::SprintNotFound { id: id.to_string() }),
            RawSprint::into_sprint,
        )
    }

    // -----------------------------------------------------------------------
    // Board
    // -----------------------------------------------------------------------

    /// Insert or fully rewrite a board card row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn put_card(&self, card: &BoardCard) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO board_cards
                (id, project_id, title, status, ord, item_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                card.id,
                card.project_id,
                card.title,
                card.status,
                card.order,
                card.item_id,
                card.created_at.to_rfc3339(),
                card.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All cards for a project, in column/position order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or row decoding fails.
    pub fn cards_for_project(&self, project_id: &str) -> Result<Vec<BoardCard>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, title, status, ord, item_id, created_at, updated_at
             FROM board_cards WHERE project_id = ?1 ORDER BY status, ord",
        )?;
        let rows = stmt.query_map(params![project_id], RawCard::from_row)?;

        let mut cards = Vec::new();
        for raw in rows {
            cards.push(raw?.into_card()?);
        }
        Ok(cards)
    }

    /// The card linked to a work item, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or row decoding fails.
    pub fn card_linked_to(&self, project_id: &str, item_id: &str) -> Result<Option<BoardCard>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, project_id, title, status, ord, item_id, created_at, updated_at
                 FROM board_cards WHERE project_id = ?1 AND item_id = ?2",
                params![project_id, item_id],
                RawCard::from_row,
            )
            .optional()?;

        raw.map(RawCard::into_card).transpose()
    }

    /// Number of cards currently in a column, for appending at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn cards_in_column(&self, project_id: &str, status: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM board_cards WHERE project_id = ?1 AND status = ?2",
            params![project_id, status],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Stored column layout for a project, if a board document exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or JSON decoding fails.
    pub fn board_columns(&self, project_id: &str) -> Result<Option<Vec<BoardColumn>>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT columns FROM boards WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|text| serde_json::from_str(&text).map_err(Error::from))
            .transpose()
    }

    /// Persist a project's column layout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn put_board_columns(&self, project_id: &str, columns: &[BoardColumn]) -> Result<()> {
        let json = serde_json::to_string(columns)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO boards (project_id, columns) VALUES (?1, ?2)",
            params![project_id, json],
        )?;
        Ok(())
    }
}

const ITEM_COLUMNS: &str = "id, project_id, sprint_id, title, description, assignee_id, \
                            priority, points, tags, status, created_at, history";

struct RawItem {
    id: String,
    project_id: String,
    sprint_id: Option<String>,
    title: String,
    description: Option<String>,
    assignee_id: Option<String>,
    priority: String,
    points: Option<f64>,
    tags: String,
    status: String,
    created_at: String,
    history: String,
}

impl RawItem {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            sprint_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            assignee_id: row.get(5)?,
            priority: row.get(6)?,
            points: row.get(7)?,
            tags: row.get(8)?,
            status: row.get(9)?,
            created_at: row.get(10)?,
            history: row.get(11)?,
        })
    }

    /// Strict decode: a corrupt history document is an error.
    fn into_item(self) -> Result<WorkItem> {
        let history = serde_json::from_str::<History>(&self.history)?;
        self.build(history)
    }

    /// Lenient decode for list reads: a corrupt history document degrades
    /// to an empty history (which the aggregators treat as "no data")
    /// instead of taking every sibling item down with it.
    fn into_item_lenient(self) -> Result<WorkItem> {
        let history = match serde_json::from_str::<History>(&self.history) {
            Ok(history) => history,
            Err(error) => {
                warn!(item = %self.id, %error, "corrupt history document; degraded to empty");
                History::default()
            }
        };
        self.build(history)
    }

    fn build(self, history: History) -> Result<WorkItem> {
        Ok(WorkItem {
            id: self.id,
            project_id: self.project_id,
            sprint_id: self.sprint_id,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            priority: self.priority.parse::<Priority>()?,
            points: self.points,
            tags: serde_json::from_str(&self.tags)?,
            status: self.status.parse::<Status>()?,
            created_at: parse_ts(&self.created_at)?,
            history,
        })
    }
}

struct RawSprint {
    id: String,
    project_id: String,
    name: String,
    goal: Option<String>,
    start_date: String,
    end_date: Option<String>,
    completed_at: Option<String>,
    status: String,
}

impl RawSprint {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            goal: row.get(3)?,
            start_date: row.get(4)?,
            end_date: row.get(5)?,
            completed_at: row.get(6)?,
            status: row.get(7)?,
        })
    }

    fn into_sprint(self) -> Result<Sprint> {
        Ok(Sprint {
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            goal: self.goal,
            start_date: parse_ts(&self.start_date)?,
            end_date: self.end_date.as_deref().map(parse_ts).transpose()?,
            completed_at: self.completed_at.as_deref().map(parse_ts).transpose()?,
            status: self.status.parse::<SprintStatus>()?,
        })
    }
}

struct RawCard {
    id: String,
    project_id: String,
    title: String,
    status: String,
    order: i64,
    item_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawCard {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            status: row.get(3)?,
            order: row.get(4)?,
            item_id: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_card(self) -> Result<BoardCard> {
        Ok(BoardCard {
            id: self.id,
            project_id: self.project_id,
            title: self.title,
            status: self.status,
            order: self.order,
            item_id: self.item_id,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

fn parse_ts(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc))
}

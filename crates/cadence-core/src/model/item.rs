use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;
use crate::history::History;

/// The six workflow statuses, in board-column order.
///
/// The ordering is a display concern only — transitions between any two
/// statuses are allowed (rollbacks included). Canonical string forms match
/// the persisted documents, including the space in `awaiting deploy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Todo,
    Doing,
    Testing,
    #[serde(rename = "awaiting deploy")]
    AwaitingDeploy,
    Deployed,
    Done,
}

impl Status {
    /// All statuses in column order.
    pub const ALL: [Self; 6] = [
        Self::Todo,
        Self::Doing,
        Self::Testing,
        Self::AwaitingDeploy,
        Self::Deployed,
        Self::Done,
    ];

    /// Canonical string form as stored in documents and column ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Testing => "testing",
            Self::AwaitingDeploy => "awaiting deploy",
            Self::Deployed => "deployed",
            Self::Done => "done",
        }
    }

    /// Display title for the matching board column.
    #[must_use]
    pub const fn column_title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::Doing => "Doing",
            Self::Testing => "Testing",
            Self::AwaitingDeploy => "Awaiting Deploy",
            Self::Deployed => "Deployed",
            Self::Done => "Done",
        }
    }

    /// Statuses that a linked board card echoes back onto its work item.
    ///
    /// The board predates the full six-status workflow; only the original
    /// three columns participate in the card-to-item bridge.
    #[must_use]
    pub const fn echoes_to_board(self) -> bool {
        matches!(self, Self::Todo | Self::Doing | Self::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "testing" => Ok(Self::Testing),
            "awaiting deploy" | "awaiting-deploy" => Ok(Self::AwaitingDeploy),
            "deployed" => Ok(Self::Deployed),
            "done" => Ok(Self::Done),
            _ => Err(Error::InvalidStatus { raw: s.to_string() }),
        }
    }
}

/// Story priority. Not part of the workflow engine; carried on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(Error::InvalidInput("priority must be low, medium, or high")),
        }
    }
}

/// A work item ("story"): the unit the board, sprints, and metrics all
/// hang off.
///
/// `history` is the durable source of truth for every derived metric and is
/// persisted verbatim; `status` is the canonical current state. The last
/// status-bearing history entry agrees with `status` (reconciliation of the
/// board representation may lag by one read, the item itself never does).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub project_id: String,
    /// `None` = backlog.
    #[serde(default)]
    pub sprint_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub history: History,
}

impl WorkItem {
    /// Create a new item in `todo` with a single seed history entry.
    #[must_use]
    pub fn new(project_id: &str, title: &str, now: DateTime<Utc>) -> Self {
        let mut history = History::default();
        history.push(crate::history::HistoryEvent::Status {
            status: Status::Todo,
            at: now,
        });

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            sprint_id: None,
            title: title.to_string(),
            description: None,
            assignee_id: None,
            priority: Priority::default(),
            points: None,
            tags: Vec::new(),
            status: Status::Todo,
            created_at: now,
            history,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Sprint lifecycle. A project has at most one `active` sprint at a time;
/// that rule is enforced by the caller creating sprints, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl SprintStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SprintStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(Error::InvalidInput(
                "sprint status must be planned, active, or completed",
            )),
        }
    }
}

/// A sprint. `completed_at` is set exactly once, on the transition to
/// `completed`, and becomes the reference "now" for lead-time math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: SprintStatus,
}

impl Sprint {
    /// Create a new active sprint starting now.
    #[must_use]
    pub fn new(project_id: &str, name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            goal: None,
            start_date: now,
            end_date: None,
            completed_at: None,
            status: SprintStatus::Active,
        }
    }

    /// Mark the sprint completed. The completion timestamp is write-once;
    /// completing an already-completed sprint keeps the original stamp.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = SprintStatus::Completed;
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// The timestamp open intervals are measured against: the completion
    /// stamp once the sprint is done, else the caller's wall clock.
    #[must_use]
    pub fn reference_now(&self, wall_now: DateTime<Utc>) -> DateTime<Utc> {
        if self.status == SprintStatus::Completed {
            self.completed_at.unwrap_or(wall_now)
        } else {
            wall_now
        }
    }
}

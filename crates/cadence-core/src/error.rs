use std::fmt;

/// Machine-readable error codes for API and CLI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ItemNotFound,
    SprintNotFound,
    InvalidStatus,
    InvalidInput,
    StorageFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ItemNotFound => "E2001",
            Self::SprintNotFound => "E2002",
            Self::InvalidStatus => "E2003",
            Self::InvalidInput => "E2004",
            Self::StorageFailure => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ItemNotFound => "Work item not found",
            Self::SprintNotFound => "Sprint not found",
            Self::InvalidStatus => "Status outside the fixed workflow set",
            Self::InvalidInput => "Malformed request payload",
            Self::StorageFailure => "Storage operation failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ItemNotFound | Self::SprintNotFound => None,
            Self::InvalidStatus => Some(
                "Use one of: todo, doing, testing, awaiting deploy, deployed, done.",
            ),
            Self::InvalidInput => Some("Check field names and value types in the payload."),
            Self::StorageFailure => Some("Check database path, permissions, and disk space."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the engine surface.
///
/// Derived-metric functions never return these: lead-time and sprint math
/// are pure, report "no data" as `None`, and clamp clock skew to zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced work item does not exist.
    #[error("work item '{id}' not found")]
    ItemNotFound { id: String },

    /// Referenced sprint does not exist.
    #[error("sprint '{id}' not found")]
    SprintNotFound { id: String },

    /// Status string outside the fixed six-value set.
    #[error("invalid status '{raw}': expected one of todo, doing, testing, \
             awaiting deploy, deployed, done")]
    InvalidStatus { raw: String },

    /// Malformed transition/update payload.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Storage errors propagate unchanged, never swallowed.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    /// A persisted document failed to round-trip through JSON.
    #[error("corrupt stored document: {0}")]
    Codec(#[from] serde_json::Error),

    /// A persisted timestamp failed to parse.
    #[error("corrupt stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

impl Error {
    /// The stable machine code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::SprintNotFound { .. } => ErrorCode::SprintNotFound,
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Storage(_) | Self::Codec(_) | Self::Timestamp(_) => ErrorCode::StorageFailure,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

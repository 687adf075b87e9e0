//! SQLite store for items, sprints, and board documents.
//!
//! Runtime defaults are intentionally conservative:
//! - `journal_mode = WAL` to allow concurrent readers while writers append
//! - `busy_timeout = 5s` to reduce transient lock failures under contention
//! - `foreign_keys = ON` to protect relational integrity
//!
//! Rows are flat columns except for `items.tags` and `items.history`, which
//! are JSON text preserved verbatim — the history array is the durable source
//! of truth for all derived metrics and must survive storage migrations
//! byte-compatible.
//!
//! Writes are plain read-modify-write with no optimistic locking; two
//! concurrent transitions on the same item race last-write-wins. Accepted
//! limitation, exercised by the engine integration tests.

pub mod schema;
pub mod store;

pub use store::Store;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{path::Path, time::Duration};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// schema to the latest version.
///
/// # Errors
///
/// Returns an error if opening/configuring/migrating the database fails.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open store database {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    schema::migrate(&mut conn).context("apply schema migrations")?;

    Ok(conn)
}

/// In-memory database with the same pragmas and schema, for tests.
///
/// # Errors
///
/// Returns an error if configuring/migrating the database fails.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory database")?;
    configure_connection(&conn).context("configure sqlite pragmas")?;
    schema::migrate(&mut conn).context("apply schema migrations")?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{open_database, schema, DEFAULT_BUSY_TIMEOUT};
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("cadence.sqlite3");
        (dir, path)
    }

    #[test]
    fn open_database_sets_wal_busy_timeout_and_fk() {
        let (_dir, path) = temp_db_path();
        let conn = open_database(&path).expect("open store db");

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .expect("query journal_mode");
        assert_eq!(journal_mode.to_ascii_lowercase(), "wal");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let foreign_keys: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("query foreign_keys");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn open_database_runs_migrations() {
        let (_dir, path) = temp_db_path();
        let conn = open_database(&path).expect("open store db");

        let version = schema::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, schema::LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn reopen_is_idempotent() {
        let (_dir, path) = temp_db_path();
        drop(open_database(&path).expect("first open"));
        let conn = open_database(&path).expect("second open");
        let version = schema::current_schema_version(&conn).expect("schema version query");
        assert_eq!(version, schema::LATEST_SCHEMA_VERSION);
    }
}

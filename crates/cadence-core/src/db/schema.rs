//! SQLite schema migrations for the cadence store.

use rusqlite::{types::Type, Connection};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 1;

/// Initial schema.
///
/// `items.history` and `items.tags` are JSON text columns; the history array
/// is written back verbatim on every update so it survives migrations intact.
const MIGRATION_V1_SQL: &str = "
CREATE TABLE IF NOT EXISTS items (
    id          TEXT PRIMARY KEY,
    project_id  TEXT NOT NULL,
    sprint_id   TEXT,
    title       TEXT NOT NULL,
    description TEXT,
    assignee_id TEXT,
    priority    TEXT NOT NULL DEFAULT 'medium',
    points      REAL,
    tags        TEXT NOT NULL DEFAULT '[]',
    status      TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    history     TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_items_project ON items(project_id);
CREATE INDEX IF NOT EXISTS idx_items_sprint  ON items(sprint_id);

CREATE TABLE IF NOT EXISTS sprints (
    id           TEXT PRIMARY KEY,
    project_id   TEXT NOT NULL,
    name         TEXT NOT NULL,
    goal         TEXT,
    start_date   TEXT NOT NULL,
    end_date     TEXT,
    completed_at TEXT,
    status       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sprints_project ON sprints(project_id);

CREATE TABLE IF NOT EXISTS board_cards (
    id         TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    title      TEXT NOT NULL,
    status     TEXT NOT NULL,
    ord        INTEGER NOT NULL DEFAULT 0,
    item_id    TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cards_project ON board_cards(project_id);

CREATE TABLE IF NOT EXISTS boards (
    project_id TEXT PRIMARY KEY,
    columns    TEXT NOT NULL
);
";

const MIGRATIONS: &[(u32, &str)] = &[(1, MIGRATION_V1_SQL)];

/// Index names every migrated database must carry.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_items_project",
    "idx_items_sprint",
    "idx_sprints_project",
    "idx_cards_project",
];

/// Read `PRAGMA user_version` and convert it to a Rust `u32`.
///
/// # Errors
///
/// Returns an error if querying SQLite fails or the version value cannot be
/// represented as `u32`.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Apply all pending migrations in ascending order.
///
/// Migrations are idempotent: each only runs when its version exceeds
/// `user_version`, and the DDL itself uses `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let mut current = current_schema_version(conn)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", i64::from(*version))?;
        tx.commit()?;
        current = *version;
    }

    Ok(current)
}

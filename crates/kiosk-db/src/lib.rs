//! # kiosk-db
//!
//! Database access layer for the Kiosk daemon.
//! Manages the single SQLite database at `$KIOSK_DATA_DIR/kiosk.db`.
//!
//! ## Schema
//!
//! - WAL mode mandatory
//! - Foreign keys enforced
//! - All timestamps are Unix epoch seconds (u64)
//! - All amounts are micro-credits (u64)
//! - Schema version stored in `PRAGMA user_version`
//!
//! Query functions take a `&Connection` so workflow code can run them
//! inside a `rusqlite` transaction (`Transaction` derefs to `Connection`).

pub mod migrations;
pub mod queries;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Whether a SQLite error is a UNIQUE/PRIMARY KEY violation.
///
/// The workflows pre-check conflicts (already purchased, duplicate
/// settlement reference) but the unique indexes are the backstop; this
/// lets callers map the backstop firing to the same conflict error.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Open or create the Kiosk database at the given path.
///
/// Configures WAL mode, foreign keys, and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("get user_version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_memory().expect("open");
        let fk: i32 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("get foreign_keys");
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_unique_violation_detection() {
        let conn = open_memory().expect("open");
        queries::accounts::insert(&conn, "0xbuyer", "Buyer", None, 100).expect("insert");
        let err = queries::accounts::insert(&conn, "0xbuyer", "Buyer", None, 100)
            .expect_err("duplicate must fail");
        match err {
            DbError::Sqlite(e) => assert!(is_unique_violation(&e)),
            other => panic!("unexpected error: {other}"),
        }
    }
}

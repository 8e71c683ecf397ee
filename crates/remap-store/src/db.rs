//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

use crate::config::SqliteOptions;
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path or `file:` URI
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(|e| from_rusqlite(e).with_op("open"))
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|e| from_rusqlite(e).with_op("open"))
}

/// Apply connection options
pub fn configure(conn: &Connection, options: &SqliteOptions) -> Result<()> {
    conn.busy_timeout(Duration::from_millis(options.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    conn.pragma_update(None, "foreign_keys", options.foreign_keys)
        .map_err(from_rusqlite)?;

    // journal_mode answers with the mode actually in effect; in-memory
    // databases always report "memory"
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", options.journal_mode.as_str(), |row| {
            row.get(0)
        })
        .map_err(from_rusqlite)?;

    tracing::debug!(journal_mode = %mode, foreign_keys = options.foreign_keys, "configured sqlite connection");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalMode;
    use tempfile::TempDir;

    #[test]
    fn test_configure_enables_foreign_keys() {
        let conn = open_in_memory().unwrap();
        configure(&conn, &SqliteOptions::default()).unwrap();

        let enabled: bool = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }

    #[test]
    fn test_configure_sets_wal_on_file_database() {
        let dir = TempDir::new().unwrap();
        let conn = open(dir.path().join("remap.db")).unwrap();
        configure(&conn, &SqliteOptions::default()).unwrap();

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_configure_respects_options() {
        let dir = TempDir::new().unwrap();
        let conn = open(dir.path().join("remap.db")).unwrap();
        let options = SqliteOptions {
            foreign_keys: false,
            journal_mode: JournalMode::Delete,
            ..SqliteOptions::default()
        };
        configure(&conn, &options).unwrap();

        let enabled: bool = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert!(!enabled);
    }
}

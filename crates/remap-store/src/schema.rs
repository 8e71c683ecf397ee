//! Persisted schema
//!
//! Two tables: `remap_keys` holds key identity and type tag, `remap_values`
//! holds the JSON payload under the same id. The schema is embedded at
//! compile time and applied with `CREATE TABLE IF NOT EXISTS`, so applying
//! it to an initialized database is a no-op.

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

pub const KEYS_TABLE: &str = "remap_keys";
pub const VALUES_TABLE: &str = "remap_values";

/// Schema DDL
pub const SCHEMA_SQL: &str = include_str!("../schema/schema.sqlite.sql");

/// Create the remap tables if they don't exist
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| from_rusqlite(e).with_op("apply_schema"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2)",
            [KEYS_TABLE, VALUES_TABLE],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(table_count(&conn), 0);

        apply_schema(&conn).unwrap();
        assert_eq!(table_count(&conn), 2);
    }

    #[test]
    fn test_idempotency() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        let result = apply_schema(&conn);
        assert!(result.is_ok());
    }
}

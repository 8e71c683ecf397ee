//! SQLite driver
//!
//! The data-source string is handed to SQLite untouched: a file path,
//! `:memory:`, or a `file:` URI such as `file:name?mode=memory&cache=shared`.

use crate::config::SqliteOptions;
use crate::sqlite_conn::SqliteConn;
use remap_core::errors::Result;
use remap_core::{Conn, Driver};

/// Name the SQLite driver is registered under
pub const DRIVER_NAME: &str = "sqlite";

/// Opens [`SqliteConn`]s with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct SqliteDriver {
    options: SqliteOptions,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver applying `options` to every connection it opens
    pub fn with_options(options: SqliteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }
}

impl Driver for SqliteDriver {
    fn open(&self, data_source: &str) -> Result<Box<dyn Conn>> {
        tracing::debug!(driver = DRIVER_NAME, "opening sqlite connection");
        let conn = SqliteConn::open(data_source, &self.options)
            .map_err(|e| e.with_driver(DRIVER_NAME))?;
        Ok(Box::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_applies_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remap.db");

        let conn = SqliteDriver::new().open(path.to_str().unwrap()).unwrap();
        conn.set_string("k", "1").unwrap();
        assert_eq!(conn.get_string("k").unwrap(), "1");
    }

    #[test]
    fn test_reopen_sees_persisted_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remap.db");
        let data_source = path.to_str().unwrap();

        {
            let conn = SqliteDriver::new().open(data_source).unwrap();
            conn.set_string("durable", "\"yes\"").unwrap();
        }

        let conn = SqliteDriver::new().open(data_source).unwrap();
        assert_eq!(conn.get_string("durable").unwrap(), "\"yes\"");
    }

    #[test]
    fn test_open_failure_names_driver() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("remap.db");

        let err = SqliteDriver::new()
            .open(path.to_str().unwrap())
            .err()
            .expect("opening inside a missing directory should fail");
        assert_eq!(err.driver(), Some(DRIVER_NAME));
    }
}

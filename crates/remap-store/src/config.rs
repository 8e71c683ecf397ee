//! Connection options for the SQLite backend
//!
//! Options are plain data so embedders can deserialize them from their own
//! configuration files.

use serde::{Deserialize, Serialize};

/// SQLite journal mode applied on open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Wal,
    Memory,
}

impl JournalMode {
    /// Value passed to `PRAGMA journal_mode`
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// Per-connection settings applied by [`crate::db::configure`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    /// How long a writer waits on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Enable `PRAGMA foreign_keys` so value rows cascade with key rows
    pub foreign_keys: bool,
    pub journal_mode: JournalMode,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            foreign_keys: true,
            journal_mode: JournalMode::Wal,
        }
    }
}

//! remap Store - SQLite storage backend
//!
//! Provides:
//! - Two-table schema (key identity, value payload) applied idempotently
//! - `SqliteConn`, the relational implementation of `remap_core::Conn`
//! - `SqliteDriver`, the factory registered under the name `sqlite`
//! - Connection options (busy timeout, foreign keys, journal mode)

pub mod config;
pub mod db;
pub mod driver;
pub mod errors;
pub mod schema;
pub mod sqlite_conn;

// Re-export key types
pub use config::{JournalMode, SqliteOptions};
pub use driver::{SqliteDriver, DRIVER_NAME};
pub use sqlite_conn::SqliteConn;

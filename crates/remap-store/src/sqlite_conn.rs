//! SQLite implementation of the storage contract
//!
//! Every key is two rows: identity in `remap_keys`, payload in
//! `remap_values` under the same id. Both are written in one transaction,
//! so a reader never sees a key without its value.
//!
//! Create-if-absent relies solely on the UNIQUE constraint on
//! `remap_keys.name`: the insert either wins or fails with a uniqueness
//! violation, which rolls the transaction back and reports `false`.

use crate::config::SqliteOptions;
use crate::db;
use crate::errors::{db_error, is_unique_violation, lock_poisoned, Result};
use crate::schema;
use remap_core::errors::{ExError, RemapError};
use remap_core::{Conn, NULL_JSON};
use remap_core_types::TypeTag;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Outcome of inserting a key row
enum KeyInsert {
    Created(i64),
    /// The name is already taken; the transaction must be abandoned
    Duplicate,
}

/// Connection handle backed by a shared SQLite connection
///
/// Clones (and `clone_conn`) share the same underlying connection; calls
/// through any of them are serialized by its mutex.
#[derive(Debug, Clone)]
pub struct SqliteConn {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConn {
    /// Open (or create) a database, configure it and apply the schema
    pub fn open<P: AsRef<Path>>(path: P, options: &SqliteOptions) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn, options)?;
        schema::apply_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database with the schema applied
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        db::configure(&conn, &SqliteOptions::default())?;
        schema::apply_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Take ownership of an existing connection
    ///
    /// The connection is used as-is: no options are applied and the schema
    /// is the caller's responsibility (see [`schema::apply_schema`]).
    pub fn from_connection(conn: Connection) -> Self {
        Self::from_shared(Arc::new(Mutex::new(conn)))
    }

    /// Share a connection the caller keeps using elsewhere
    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Run `f` with exclusive access to the underlying connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.lock("with_connection")?;
        f(&mut conn)
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| lock_poisoned(op))
    }
}

fn begin<'c>(conn: &'c mut Connection, op: &str) -> Result<Transaction<'c>> {
    // IMMEDIATE takes the write lock up front, so concurrent writers queue
    // on busy_timeout instead of failing on a read-to-write upgrade
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| db_error(op, "error beginning transaction", e))
}

fn insert_key(tx: &Transaction<'_>, key: &str) -> rusqlite::Result<KeyInsert> {
    match tx.execute(
        "INSERT INTO remap_keys (name, type_tag) VALUES (?1, ?2)",
        rusqlite::params![key, TypeTag::String.as_i64()],
    ) {
        Ok(_) => Ok(KeyInsert::Created(tx.last_insert_rowid())),
        Err(e) if is_unique_violation(&e) => Ok(KeyInsert::Duplicate),
        Err(e) => Err(e),
    }
}

impl Conn for SqliteConn {
    fn clone_conn(&self) -> Result<Box<dyn Conn>> {
        Ok(Box::new(self.clone()))
    }

    fn set_if_not_exists(&self, key: &str, value: &str) -> Result<bool> {
        const OP: &str = "set_if_not_exists";
        let mut conn = self.lock(OP)?;
        let tx = begin(&mut conn, OP)?;

        let id = match insert_key(&tx, key)
            .map_err(|e| db_error(OP, "error inserting key", e).with_key(key))?
        {
            KeyInsert::Created(id) => id,
            KeyInsert::Duplicate => {
                tracing::debug!(key, "key already exists, nothing written");
                return Ok(false);
            }
        };

        // A stale value row can only exist if something outside remap wrote
        // one; overwrite it rather than fail
        tx.execute(
            "INSERT INTO remap_values (id, payload) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
            rusqlite::params![id, value],
        )
        .map_err(|e| db_error(OP, "error inserting value", e).with_key(key))?;

        tx.commit()
            .map_err(|e| db_error(OP, "error committing transaction", e).with_key(key))?;

        tracing::debug!(key, id, "created key");
        Ok(true)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        const OP: &str = "set_string";
        let mut conn = self.lock(OP)?;
        let tx = begin(&mut conn, OP)?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM remap_keys WHERE name = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| db_error(OP, "error querying key", e).with_key(key))?;

        match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE remap_values SET payload = ?1 WHERE id = ?2",
                    rusqlite::params![value, id],
                )
                .map_err(|e| db_error(OP, "error updating value", e).with_key(key))?;
            }
            None => {
                let id = match insert_key(&tx, key)
                    .map_err(|e| db_error(OP, "error inserting key", e).with_key(key))?
                {
                    KeyInsert::Created(id) => id,
                    // Unreachable while the write lock is held; report rather than guess
                    KeyInsert::Duplicate => {
                        return Err(ExError::from(RemapError::Persistence {
                            message: "key appeared inside write transaction".to_string(),
                        })
                        .with_op(OP)
                        .with_key(key));
                    }
                };
                tx.execute(
                    "INSERT INTO remap_values (id, payload) VALUES (?1, ?2)",
                    rusqlite::params![id, value],
                )
                .map_err(|e| db_error(OP, "error inserting value", e).with_key(key))?;
            }
        }

        tx.commit()
            .map_err(|e| db_error(OP, "error committing transaction", e).with_key(key))?;

        Ok(())
    }

    fn del_string(&self, key: &str) -> Result<()> {
        const OP: &str = "del_string";
        let mut conn = self.lock(OP)?;
        let tx = begin(&mut conn, OP)?;

        // Explicit paired delete: adopted connections may not have
        // foreign_keys enabled, so ON DELETE CASCADE can't be relied on
        tx.execute(
            "DELETE FROM remap_values WHERE id IN (SELECT id FROM remap_keys WHERE name = ?1)",
            [key],
        )
        .map_err(|e| db_error(OP, "error deleting value", e).with_key(key))?;

        let removed = tx
            .execute("DELETE FROM remap_keys WHERE name = ?1", [key])
            .map_err(|e| db_error(OP, "error deleting key", e).with_key(key))?;

        tx.commit()
            .map_err(|e| db_error(OP, "error committing transaction", e).with_key(key))?;

        tracing::debug!(key, removed, "deleted key");
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<String> {
        const OP: &str = "get_string";
        let conn = self.lock(OP)?;

        let payload: Option<Option<String>> = conn
            .query_row(
                "SELECT v.payload
                   FROM remap_keys AS k
                   JOIN remap_values AS v ON v.id = k.id
                  WHERE k.name = ?1 AND k.type_tag = ?2",
                rusqlite::params![key, TypeTag::String.as_i64()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| db_error(OP, "error querying value", e).with_key(key))?;

        match payload {
            Some(Some(value)) => Ok(value),
            Some(None) => Ok(NULL_JSON.to_string()),
            None => Err(ExError::from(RemapError::KeyNotFound {
                key: key.to_string(),
            })
            .with_op(OP)),
        }
    }
}

//! In-memory storage backend
//!
//! Keeps every entry in a shared `HashMap`. Handles produced by
//! `clone_conn` share the same map.

use crate::conn::{Conn, Driver};
use crate::errors::{ExError, RemapError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory connection
#[derive(Debug, Clone, Default)]
pub struct MemoryConn {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryConn {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> Result<usize> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read("is_empty")?.is_empty())
    }

    fn read(&self, op: &str) -> Result<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.entries.read().map_err(|_| poisoned(op))
    }

    fn write(&self, op: &str) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.entries.write().map_err(|_| poisoned(op))
    }
}

fn poisoned(op: &str) -> ExError {
    ExError::from(RemapError::LockPoisoned {
        resource: "memory store".to_string(),
    })
    .with_op(op)
}

impl Conn for MemoryConn {
    fn clone_conn(&self) -> Result<Box<dyn Conn>> {
        Ok(Box::new(self.clone()))
    }

    fn set_if_not_exists(&self, key: &str, value: &str) -> Result<bool> {
        let mut entries = self.write("set_if_not_exists")?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.write("set_string")?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn del_string(&self, key: &str) -> Result<()> {
        self.write("del_string")?.remove(key);
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<String> {
        self.read("get_string")?.get(key).cloned().ok_or_else(|| {
            ExError::from(RemapError::KeyNotFound {
                key: key.to_string(),
            })
            .with_op("get_string")
        })
    }
}

/// Driver for [`MemoryConn`]
///
/// Every `open` returns a fresh, empty store. The data-source string is
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDriver;

impl Driver for MemoryDriver {
    fn open(&self, _data_source: &str) -> Result<Box<dyn Conn>> {
        tracing::debug!("opening in-memory store");
        Ok(Box::new(MemoryConn::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    #[test]
    fn test_set_if_not_exists_only_first_wins() {
        let conn = MemoryConn::new();
        assert!(conn.set_if_not_exists("cool", "\"beans\"").unwrap());
        assert!(!conn.set_if_not_exists("cool", "\"guy\"").unwrap());
        assert_eq!(conn.get_string("cool").unwrap(), "\"beans\"");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let conn = MemoryConn::new();
        let err = conn.get_string("nope").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.key(), Some("nope"));
    }

    #[test]
    fn test_del_absent_is_noop() {
        let conn = MemoryConn::new();
        conn.del_string("never-set").unwrap();
        assert!(conn.is_empty().unwrap());
    }

    #[test]
    fn test_clone_conn_shares_storage() {
        let conn = MemoryConn::new();
        let other = conn.clone_conn().unwrap();
        other.set_string("shared", "1").unwrap();
        assert_eq!(conn.get_string("shared").unwrap(), "1");
        assert_eq!(conn.len().unwrap(), 1);
    }

    #[test]
    fn test_driver_opens_independent_stores() {
        let a = MemoryDriver.open("").unwrap();
        let b = MemoryDriver.open("").unwrap();
        a.set_string("k", "1").unwrap();
        assert!(b.get_string("k").unwrap_err().is_not_found());
    }
}

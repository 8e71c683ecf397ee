//! JSON facade over a storage connection
//!
//! ## Logging Ownership
//!
//! `Map` owns lifecycle logging for every public operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success (a `get` miss is a success with `found = false`)
//! - `log_op_error!` on failure
//!
//! Backends use only `tracing::debug!()` for internal details.

use remap_core::errors::{ExError, RemapError, Result};
use remap_core::{log_op_end, log_op_error, log_op_start, Conn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Which JSON shapes `set` and `set_if_not_exists` accept
///
/// Every stored value is tagged as a string regardless of its JSON shape.
/// `Accept` stores objects and arrays as whole documents; `Reject` refuses
/// them with `InvalidType`, keeping the store to scalar values only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositePolicy {
    #[default]
    Accept,
    Reject,
}

/// Key-value map storing serde values as JSON
pub struct Map {
    conn: Box<dyn Conn>,
    policy: CompositePolicy,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map").field("policy", &self.policy).finish()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl Map {
    /// Wrap a connection the map takes ownership of
    pub fn new(conn: Box<dyn Conn>) -> Self {
        Self {
            conn,
            policy: CompositePolicy::default(),
        }
    }

    /// Build a map over an existing live connection
    ///
    /// The map holds its own handle from [`Conn::clone_conn`]; the caller
    /// keeps using `other` and both see the same data.
    pub fn adopt(other: &dyn Conn) -> Result<Self> {
        let conn = other.clone_conn().map_err(|e| e.wrap("map_adopt"))?;
        Ok(Self::new(conn))
    }

    /// Set the composite value policy
    pub fn with_policy(mut self, policy: CompositePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CompositePolicy {
        self.policy
    }

    /// Another map sharing this map's storage and policy
    pub fn try_clone(&self) -> Result<Self> {
        let conn = self.conn.clone_conn().map_err(|e| e.wrap("map_clone"))?;
        Ok(Self {
            conn,
            policy: self.policy,
        })
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// ## Errors
    ///
    /// - `InvalidType`: value is an object or array under `CompositePolicy::Reject`
    /// - `Serialization`: value could not be encoded as JSON
    /// - `Persistence`: backend failure
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        log_op_start!("map_set", key = key);
        let start = Instant::now();

        self.encode("map_set", key, value)
            .and_then(|json| {
                self.conn
                    .set_string(key, &json)
                    .map_err(|e| e.wrap("map_set"))
            })
            .map_err(|e| {
                log_op_error!("map_set", e.clone(), duration_ms = elapsed_ms(start), key = key);
                e
            })?;

        log_op_end!("map_set", duration_ms = elapsed_ms(start), key = key);
        Ok(())
    }

    /// Store `value` under `key` only if the key is absent
    ///
    /// Returns `true` if the key was created, `false` if it already existed
    /// (in which case nothing is written). Concurrent callers racing on one
    /// key see exactly one `true`.
    ///
    /// ## Errors
    ///
    /// Same as [`Map::set`]; an existing key is not an error.
    pub fn set_if_not_exists<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<bool> {
        log_op_start!("map_set_if_not_exists", key = key);
        let start = Instant::now();

        let created = self
            .encode("map_set_if_not_exists", key, value)
            .and_then(|json| {
                self.conn
                    .set_if_not_exists(key, &json)
                    .map_err(|e| e.wrap("map_set_if_not_exists"))
            })
            .map_err(|e| {
                log_op_error!(
                    "map_set_if_not_exists",
                    e.clone(),
                    duration_ms = elapsed_ms(start),
                    key = key
                );
                e
            })?;

        log_op_end!(
            "map_set_if_not_exists",
            duration_ms = elapsed_ms(start),
            key = key,
            created = created
        );
        Ok(created)
    }

    /// Fetch and decode the value stored under `key`
    ///
    /// ## Errors
    ///
    /// - `NotFound`: key does not exist
    /// - `Serialization`: stored JSON does not decode into `T`
    /// - `Persistence`: backend failure
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        log_op_start!("map_get", key = key);
        let start = Instant::now();

        let result = self.get_impl(key);
        match &result {
            Ok(_) => {
                log_op_end!(
                    "map_get",
                    duration_ms = elapsed_ms(start),
                    key = key,
                    found = true
                );
            }
            // A miss is an expected outcome, not a failure
            Err(e) if e.is_not_found() => {
                log_op_end!(
                    "map_get",
                    duration_ms = elapsed_ms(start),
                    key = key,
                    found = false
                );
            }
            Err(e) => {
                log_op_error!(
                    "map_get",
                    e.clone(),
                    duration_ms = elapsed_ms(start),
                    key = key
                );
            }
        }
        result
    }

    fn get_impl<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.conn.get_string(key).map_err(|e| e.wrap("map_get"))?;
        serde_json::from_str(&raw).map_err(|e| ExError::from(e).with_op("map_get").with_key(key))
    }

    /// Remove `key`; succeeds whether or not the key existed
    pub fn del(&self, key: &str) -> Result<()> {
        log_op_start!("map_del", key = key);
        let start = Instant::now();

        self.conn.del_string(key).map_err(|e| {
            let e = e.wrap("map_del");
            log_op_error!("map_del", e.clone(), duration_ms = elapsed_ms(start), key = key);
            e
        })?;

        log_op_end!("map_del", duration_ms = elapsed_ms(start), key = key);
        Ok(())
    }

    fn encode<T: Serialize + ?Sized>(&self, op: &str, key: &str, value: &T) -> Result<String> {
        let json =
            serde_json::to_string(value).map_err(|e| ExError::from(e).with_op(op).with_key(key))?;
        if self.policy == CompositePolicy::Reject {
            if let Some(shape) = composite_shape(&json) {
                return Err(ExError::from(RemapError::InvalidType {
                    key: key.to_string(),
                    shape: shape.to_string(),
                })
                .with_op(op));
            }
        }
        Ok(json)
    }
}

/// Shape of a serialized value if it is an object or array
///
/// `serde_json::to_string` emits no leading whitespace, so the first byte
/// decides.
fn composite_shape(json: &str) -> Option<&'static str> {
    match json.as_bytes().first() {
        Some(b'{') => Some("object"),
        Some(b'[') => Some("array"),
        _ => None,
    }
}

//! Storage connection contract
//!
//! A `Conn` is durable string-to-string storage with one atomic primitive
//! (`set_if_not_exists`). Backends implement it; the facade only ever talks
//! to `dyn Conn`, so engines can be swapped at construction time.

use crate::errors::Result;

/// JSON representation returned for a stored NULL payload
pub const NULL_JSON: &str = "null";

/// Capability set every storage backend provides
///
/// All methods take `&self`: a connection may be used concurrently from
/// several threads, and each call is independently atomic.
pub trait Conn: Send + Sync {
    /// Return a new handle sharing the same underlying storage
    ///
    /// This never copies data. Writes through either handle are visible
    /// through the other.
    fn clone_conn(&self) -> Result<Box<dyn Conn>>;

    /// Insert `(key, value)` only if `key` is absent
    ///
    /// Returns `Ok(false)` without mutating anything when the key already
    /// exists. Under concurrent callers racing on one key, exactly one
    /// observes `Ok(true)`.
    fn set_if_not_exists(&self, key: &str, value: &str) -> Result<bool>;

    /// Create or overwrite `key` as a single atomic unit
    fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` and its payload; absent keys are a no-op
    fn del_string(&self, key: &str) -> Result<()>;

    /// Return the JSON payload stored under `key`
    ///
    /// # Errors
    ///
    /// `NotFound` when the key does not exist. A stored NULL payload is not
    /// an error and reads back as [`NULL_JSON`].
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Factory that opens a [`Conn`] from an opaque data-source string
pub trait Driver: Send + Sync {
    /// Open a connection; `data_source` is passed through untouched
    fn open(&self, data_source: &str) -> Result<Box<dyn Conn>>;
}

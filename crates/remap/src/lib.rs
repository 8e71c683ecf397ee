//! remap - a JSON key-value map over swappable storage backends
//!
//! Callers set and fetch any serde value under string keys. Values are
//! stored as JSON strings by a [`Conn`] backend chosen at construction time,
//! either by driver name through the [`DriverRegistry`] or by adopting a
//! connection the caller already owns.
//!
//! ```
//! let map = remap::open("sqlite", ":memory:").unwrap();
//! map.set("cool", "beans").unwrap();
//! let value: String = map.get("cool").unwrap();
//! assert_eq!(value, "beans");
//! ```

pub mod map;
pub mod registry;

pub use map::{CompositePolicy, Map};
pub use registry::{adopt, open, register, registry, DriverRegistry};

pub use remap_core::logging_facility;
pub use remap_core::{Conn, Driver, ExError, ExErrorKind, MemoryConn, MemoryDriver, Result};
pub use remap_store::{SqliteConn, SqliteDriver, SqliteOptions};

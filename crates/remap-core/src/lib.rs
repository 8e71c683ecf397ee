//! remap Core - storage contract, error facility and logging facility
//!
//! This crate provides the pieces every remap backend and the facade share:
//! - The `Conn` storage capability set and the `Driver` factory trait
//! - The structured error facility (`ExError`, `ExErrorKind`, `RemapError`)
//! - The structured logging facility (`init`, `log_op_*` macros, test capture)
//! - An in-memory backend implementing the storage contract

pub mod conn;
pub mod errors;
pub mod logging_facility;
pub mod memory;

// Used by the logging macros so callers don't need a direct dependency
pub use remap_core_types as core_types;

// Re-export commonly used types
pub use conn::{Conn, Driver, NULL_JSON};
pub use errors::{ExError, ExErrorKind, RemapError, Result};
pub use memory::{MemoryConn, MemoryDriver};
pub use remap_core_types::TypeTag;

//! Error handling for remap-store
//!
//! Wraps remap-core ExError with SQLite-specific helpers

use remap_core::errors::{ExError, ExErrorKind, RemapError};

pub use remap_core::errors::Result;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a database error for a named operation step
pub fn db_error(op: &str, step: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op)
        .with_message(format!("{}: {}", step, err))
}

/// Create an error for a poisoned connection mutex
pub fn lock_poisoned(op: &str) -> ExError {
    ExError::from(RemapError::LockPoisoned {
        resource: "sqlite connection".to_string(),
    })
    .with_op(op)
}

/// Whether `err` is a UNIQUE constraint violation
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

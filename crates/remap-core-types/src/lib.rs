//! Core types shared across remap facilities
//!
//! This crate provides foundational types used by the error facility,
//! the logging facility and every storage backend:
//!
//! - **Type tags**: the persisted discriminant for stored values
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod type_tag;

pub use type_tag::TypeTag;

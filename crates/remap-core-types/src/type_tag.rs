//! Persisted value type tags
//!
//! Every key record carries a tag describing the shape of its value.
//! Only [`TypeTag::String`] is written today: every value, whatever its JSON
//! shape, is stored as one serialized string. `Object` and `Array` are
//! reserved for per-field and per-index storage, and readers skip rows
//! carrying them.

/// Discriminant stored in the `type_tag` column of the key table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// The value is a single JSON document stored as a string
    String,
    /// Reserved: the value is a JSON object stored field by field
    Object,
    /// Reserved: the value is a JSON array stored index by index
    Array,
}

impl TypeTag {
    /// Integer representation used in the persisted schema
    pub fn as_i64(self) -> i64 {
        match self {
            TypeTag::String => 1,
            TypeTag::Object => 2,
            TypeTag::Array => 3,
        }
    }
}

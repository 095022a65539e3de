//! Error types for the record model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building schemas or validating records against them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A field name appears twice in a schema or key-field list.
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),

    /// A key-field list was empty.
    #[error("at least one key field is required")]
    NoKeyFields,

    /// A key field is not part of the schema.
    #[error("key field '{0}' is not in the schema")]
    MissingKeyField(String),

    /// A record names a field the schema does not have.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A record lacks a field the schema requires.
    #[error("record is missing field '{0}'")]
    MissingField(String),
}

//! Error types for the record store.

use std::fmt;
use std::io;
use std::path::PathBuf;

use recordbook_model::{Key, ModelError, Value};
use recordbook_table::TableError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Key(Key),
    Field { field: String, value: Value },
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Key(key) => write!(f, "key {key}"),
            Lookup::Field { field, value } => write!(f, "{field} = {:?}", value.to_cell()),
        }
    }
}

/// Errors that can occur in record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Add or a key-changing edit would produce a second record with this key.
    #[error("a record with key {key} already exists")]
    DuplicateKey { key: Key },

    /// Lookup, delete or edit target is absent.
    #[error("no record matches {0}")]
    NotFound(Lookup),

    /// Key fields are not usable with the schema (absent, empty, repeated).
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A record or lookup names a field the schema does not have.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A record lacks one of the schema's fields.
    #[error("record is missing field '{0}'")]
    MissingField(String),

    /// Restore or import source (or a backing file that was never written).
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// IO or permission failure while reading or writing a file.
    #[error("{operation} failed for {}: {source}", .path.display())]
    Persistence {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Import source cannot be used at all. Per-row duplicates are not errors.
    #[error("cannot import {}: {reason}", .path.display())]
    Import { path: PathBuf, reason: String },

    /// A backing file or backup cannot be decoded.
    #[error("malformed table {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

impl StoreError {
    pub(crate) fn persistence(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        StoreError::Persistence {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Routes codec failures: IO trouble is a persistence error, anything else
    /// means the table itself is bad.
    pub(crate) fn from_table(
        operation: &'static str,
        path: impl Into<PathBuf>,
        err: TableError,
    ) -> Self {
        let path = path.into();
        match err.into_io() {
            Ok(source) => StoreError::persistence(operation, path, source),
            Err(source) => StoreError::Malformed { path, source },
        }
    }
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnknownField(field) => StoreError::UnknownField(field),
            ModelError::MissingField(field) => StoreError::MissingField(field),
            other => StoreError::SchemaMismatch(other.to_string()),
        }
    }
}

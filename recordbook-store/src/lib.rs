//! File-backed, hash-indexed record store for Recordbook.
//!
//! A [`RecordStore`] keeps records in a `HashMap` keyed by the values of the
//! caller's key fields and mirrors them to a delimited-text file whose first
//! row is the schema.
//!
//! # Architecture
//!
//! - The in-memory index is authoritative; persistence is an explicit step
//! - Every file write is all-or-nothing (temp file + rename)
//! - Key fields are supplied on every open; the file never records them
//! - Bulk import skips duplicate keys instead of failing, and reports counts

mod error;
mod fs;
mod persistence;
mod store;

pub use error::{Lookup, StoreError, StoreResult};
pub use recordbook_model::{Key, KeyFields, Record, Schema, Value};
pub use recordbook_table::{CsvCodec, TableCodec};
pub use store::RecordStore;

/// Outcome of [`RecordStore::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows inserted into the index.
    pub added: usize,
    /// Rows whose key was already present.
    pub skipped: usize,
}

impl ImportSummary {
    /// Rows read from the source.
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }
}

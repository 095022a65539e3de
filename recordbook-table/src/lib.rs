//! Tabular encoding for Recordbook.
//!
//! A [`Table`] is a header row plus rectangular rows of raw cell strings.
//! [`TableCodec`] turns bytes into tables and back; [`CsvCodec`] is the
//! delimited-text implementation every store uses by default. Header names
//! round-trip exactly, including case and surrounding whitespace.

mod codec;
mod error;
mod table;

pub use codec::{CsvCodec, TableCodec};
pub use error::{TableError, TableResult};
pub use table::Table;

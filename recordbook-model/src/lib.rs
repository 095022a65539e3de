//! Core record model for Recordbook.
//!
//! Defines the types every other Recordbook crate depends on:
//! - [`Value`]: a typed spreadsheet cell (empty, text, integer, float, date)
//! - [`Record`]: a mapping from field name to [`Value`]
//! - [`Key`]: the ordered tuple of a record's key-field values
//! - [`Schema`]: the ordered, unique list of field names (column order)
//! - [`KeyFields`]: the subset of the schema that defines record identity
//!
//! Values compare by their canonical cell text, so a value a caller typed and
//! the same cell read back from disk are interchangeable as key components.

mod error;
mod key;
mod record;
mod schema;
mod value;

pub use error::{ModelError, ModelResult};
pub use key::Key;
pub use record::Record;
pub use schema::{KeyFields, Schema};
pub use value::{Value, DATE_FORMAT};

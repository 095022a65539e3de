//! Error types for table decoding and encoding.

use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, Error)]
pub enum TableError {
    /// Underlying reader or writer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text parse or write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source has no header row, or the header has no columns.
    #[error("table has no header row")]
    MissingHeader,

    /// The header names the same column twice.
    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),

    /// A row's width differs from the header's.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl TableError {
    /// Splits out failures of the underlying reader or writer, including the
    /// ones `csv` wraps, so callers can report them as IO rather than as bad
    /// data. Other errors are handed back unchanged.
    pub fn into_io(self) -> Result<std::io::Error, TableError> {
        match self {
            TableError::Io(e) => Ok(e),
            TableError::Csv(e) => {
                let kind = match e.kind() {
                    csv::ErrorKind::Io(io) => Some(io.kind()),
                    _ => None,
                };
                match kind {
                    Some(kind) => Ok(std::io::Error::new(kind, e)),
                    None => Err(TableError::Csv(e)),
                }
            }
            other => Err(other),
        }
    }
}

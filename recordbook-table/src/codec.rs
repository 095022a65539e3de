use std::io::{Read, Write};

use tracing::trace;

use crate::{Table, TableResult};

/// Encodes and decodes [`Table`]s.
///
/// Implementations must round-trip header names exactly; the store relies on
/// header text to find its key fields again on the next open.
pub trait TableCodec {
    /// Reads a header row and all data rows.
    fn decode(&self, reader: &mut dyn Read) -> TableResult<Table>;

    /// Writes the header row followed by every data row, in order.
    fn encode(&self, writer: &mut dyn Write, table: &Table) -> TableResult<()>;
}

/// Delimited text (CSV by default).
///
/// ```
/// use recordbook_table::{CsvCodec, Table, TableCodec};
///
/// let codec = CsvCodec::new().with_delimiter(b';');
/// let table = codec.decode(&mut "Name;Phone\nAnna;007\n".as_bytes()).unwrap();
/// assert_eq!(table.columns(), &["Name", "Phone"]);
/// assert_eq!(table.rows()[0], vec!["Anna", "007"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvCodec {
    delimiter: u8,
}

impl CsvCodec {
    pub const DEFAULT_DELIMITER: u8 = b',';

    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: Self::DEFAULT_DELIMITER,
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCodec for CsvCodec {
    fn decode(&self, reader: &mut dyn Read) -> TableResult<Table> {
        // Width is checked by `Table::push_row` so ragged rows report a row
        // number instead of a byte position.
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(columns)?;
        for record in csv.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        trace!(
            columns = table.columns().len(),
            rows = table.len(),
            "decoded table"
        );
        Ok(table)
    }

    fn encode(&self, writer: &mut dyn Write, table: &Table) -> TableResult<()> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);
        csv.write_record(table.columns())?;
        for row in table.rows() {
            csv.write_record(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}

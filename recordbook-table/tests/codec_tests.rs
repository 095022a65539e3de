use pretty_assertions::assert_eq;
use recordbook_table::{CsvCodec, Table, TableCodec, TableError};

fn decode(codec: &CsvCodec, text: &str) -> Result<Table, TableError> {
    codec.decode(&mut text.as_bytes())
}

fn encode(codec: &CsvCodec, table: &Table) -> String {
    let mut out = Vec::new();
    codec.encode(&mut out, table).unwrap();
    String::from_utf8(out).unwrap()
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[test]
fn decode_header_and_rows() {
    let table = decode(&CsvCodec::new(), "Name,Surname,Phone\nAnna,Li,89990001111\n").unwrap();
    assert_eq!(table.columns(), &["Name", "Surname", "Phone"]);
    assert_eq!(table.rows(), &[strings(&["Anna", "Li", "89990001111"])]);
}

#[test]
fn header_only_table_has_no_rows() {
    let table = decode(&CsvCodec::new(), "Phone\n").unwrap();
    assert_eq!(table.columns(), &["Phone"]);
    assert!(table.is_empty());
}

#[test]
fn header_whitespace_and_case_survive() {
    let mut table = Table::new(strings(&[" Name", "name "])).unwrap();
    table.push_row(strings(&["a", "b"])).unwrap();
    let codec = CsvCodec::new();
    let back = decode(&codec, &encode(&codec, &table)).unwrap();
    assert_eq!(back, table);
}

#[test]
fn quoting_roundtrips_delimiters_and_newlines() {
    let mut table = Table::new(strings(&["Note"])).unwrap();
    table.push_row(strings(&["a, \"quoted\"\nline"])).unwrap();
    let codec = CsvCodec::new();
    assert_eq!(decode(&codec, &encode(&codec, &table)).unwrap(), table);
}

#[test]
fn custom_delimiter() {
    let codec = CsvCodec::new().with_delimiter(b'\t');
    let mut table = Table::new(strings(&["A", "B"])).unwrap();
    table.push_row(strings(&["1,5", "x"])).unwrap();
    let text = encode(&codec, &table);
    assert_eq!(text, "A\tB\n1,5\tx\n");
    assert_eq!(decode(&codec, &text).unwrap(), table);
}

#[test]
fn empty_input_has_no_header() {
    let err = decode(&CsvCodec::new(), "").unwrap_err();
    assert!(matches!(err, TableError::MissingHeader));
}

#[test]
fn duplicate_header_rejected() {
    let err = decode(&CsvCodec::new(), "A,A\n1,2\n").unwrap_err();
    assert!(matches!(err, TableError::DuplicateColumn(c) if c == "A"));
}

#[test]
fn ragged_row_reports_row_number() {
    let err = decode(&CsvCodec::new(), "A,B\n1,2\n3\n").unwrap_err();
    match err {
        TableError::RaggedRow {
            row,
            expected,
            found,
        } => {
            assert_eq!((row, expected, found), (2, 2, 1));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_utf8_is_a_csv_error() {
    let bytes: &[u8] = b"A\n\xff\xfe\n";
    let err = CsvCodec::new().decode(&mut &bytes[..]).unwrap_err();
    assert!(matches!(err, TableError::Csv(_)));
}

#[test]
fn error_display_is_actionable() {
    let err = TableError::RaggedRow {
        row: 3,
        expected: 2,
        found: 5,
    };
    assert_eq!(err.to_string(), "row 3 has 5 cells, expected 2");
}

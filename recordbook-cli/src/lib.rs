//! Argument parsing and command execution for the `recordbook` binary.
//!
//! Every command opens the store named by `--db` with the key fields named by
//! `--key`, runs one operation, and saves when the operation changed the
//! index. Output goes to the supplied writer so tests can capture it.

use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recordbook_store::{CsvCodec, Key, Record, RecordStore, StoreError, Value};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "recordbook")]
#[command(about = "Keyed records in a spreadsheet-compatible file")]
pub struct Args {
    /// Backing table file
    #[arg(short, long, env = "RECORDBOOK_DB")]
    pub db: PathBuf,

    /// Key field; repeat or comma-separate for composite keys
    #[arg(short, long = "key", value_delimiter = ',', required = true)]
    pub keys: Vec<String>,

    /// Cell delimiter (a single ASCII character, or "tab")
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Print records as JSON instead of tab-separated rows
    #[arg(long)]
    pub json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new, empty store (replaces an existing file)
    Create {
        /// Every column, in order; must include the key fields
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
    },
    /// Append a column; existing records get an empty cell
    AddField { name: String },
    /// Add a record; omitted columns are left empty
    Add {
        #[arg(required = true, value_name = "FIELD=VALUE")]
        cells: Vec<Assignment>,
    },
    /// Look up one record by its key values, in key-field order
    Get {
        #[arg(required = true)]
        key: Vec<String>,
    },
    /// List records whose field equals a value
    Find { field: String, value: String },
    /// List every record
    List,
    /// Delete by key, or every record whose field equals a value
    Delete {
        #[arg(long, num_args = 1.., conflicts_with = "field", required_unless_present = "field")]
        key: Vec<String>,
        #[arg(long, requires = "value")]
        field: Option<String>,
        #[arg(long, requires = "field")]
        value: Option<String>,
    },
    /// Change fields of the record at a key; key fields may change too
    Edit {
        #[arg(required = true)]
        key: Vec<String>,
        #[arg(long = "set", required = true, value_name = "FIELD=VALUE")]
        cells: Vec<Assignment>,
    },
    /// Remove every record and save the empty store
    Clear,
    /// Copy the backing file as saved on disk
    Backup { path: PathBuf },
    /// Replace the backing file with a backup and reload
    Restore { path: PathBuf },
    /// Merge rows from another file, skipping keys already present
    Import { path: PathBuf },
    /// Write every record to another file
    Export { path: PathBuf },
    /// Delete the backing file
    Drop,
}

/// A `FIELD=VALUE` pair. The value may be empty; the field may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((field, value)) if !field.is_empty() => Ok(Self {
                field: field.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected FIELD=VALUE, got '{s}'")),
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be one ASCII character, got '{s}'")),
    }
}

fn key_from(values: &[String]) -> Key {
    values.iter().map(Value::from).collect()
}

/// Runs one command, writing its output to `out`.
pub fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    let codec = CsvCodec::new().with_delimiter(args.delimiter);

    let mut store = match &args.command {
        Command::Create { fields } => {
            RecordStore::create_with(&args.db, fields, &args.keys, codec)
                .with_context(|| format!("failed to create {}", args.db.display()))?;
            writeln!(out, "created {}", args.db.display())?;
            return Ok(());
        }
        _ => RecordStore::open_with(&args.db, &args.keys, codec)
            .with_context(|| format!("failed to open {}", args.db.display()))?,
    };
    debug!(command = ?args.command, records = store.len(), "running command");

    match &args.command {
        // Runs before a store is opened.
        Command::Create { .. } => {}
        Command::AddField { name } => {
            store.extend_schema(name.as_str())?;
            store.save()?;
            writeln!(out, "added field {name}")?;
        }
        Command::Add { cells } => {
            let mut record: Record = store
                .schema()
                .fields()
                .iter()
                .map(|f| (f.clone(), Value::Empty))
                .collect();
            for cell in cells {
                record.set(cell.field.clone(), cell.value.as_str());
            }
            let key = store.add(record)?;
            store.save()?;
            writeln!(out, "added {key}")?;
        }
        Command::Get { key } => {
            let record = store.search(&key_from(key))?;
            print_records(&store, std::iter::once(record), args.json, out)?;
        }
        Command::Find { field, value } => {
            let records = store.find_by_field(field, &Value::from(value))?;
            print_records(&store, records.into_iter(), args.json, out)?;
        }
        Command::List => {
            print_records(&store, store.records(), args.json, out)?;
        }
        Command::Delete { key, field, value } => {
            let removed = match (field, value) {
                (Some(field), Some(value)) => store.delete_by_field(field, &Value::from(value))?,
                _ => store.delete_by_key(&key_from(key)).map(|_| 1)?,
            };
            store.save()?;
            writeln!(out, "deleted {removed} record(s)")?;
        }
        Command::Edit { key, cells } => {
            let old_key = key_from(key);
            let mut record = store.search(&old_key)?.clone();
            for cell in cells {
                record.set(cell.field.clone(), cell.value.as_str());
            }
            let new_key = store.edit(&old_key, record)?;
            store.save()?;
            writeln!(out, "updated {new_key}")?;
        }
        Command::Clear => {
            store.clear()?;
            writeln!(out, "cleared {}", args.db.display())?;
        }
        Command::Backup { path } => {
            store.backup(path)?;
            writeln!(out, "backed up to {}", path.display())?;
        }
        Command::Restore { path } => {
            store.restore(path)?;
            writeln!(out, "restored {} record(s) from {}", store.len(), path.display())?;
        }
        Command::Import { path } => {
            let summary = store.import(path)?;
            writeln!(
                out,
                "imported {} record(s), skipped {} duplicate(s)",
                summary.added, summary.skipped
            )?;
        }
        Command::Export { path } => {
            store.export(path)?;
            writeln!(out, "exported {} record(s) to {}", store.len(), path.display())?;
        }
        Command::Drop => {
            store.destroy()?;
            writeln!(out, "deleted {}", args.db.display())?;
        }
    }
    Ok(())
}

/// Prints records sorted by key, as tab-separated rows under a header line
/// or as a JSON array.
fn print_records<'a>(
    store: &RecordStore,
    records: impl Iterator<Item = &'a Record>,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut records: Vec<&Record> = records.collect();
    records.sort_by_cached_key(|r| store.key_of(r).map(|k| k.to_string()).unwrap_or_default());

    if json {
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "{}", store.schema().fields().join("\t"))?;
    for record in records {
        writeln!(out, "{}", record.to_row(store.schema()).join("\t"))?;
    }
    Ok(())
}

/// Process exit status for a failed command, by error kind.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::NotFound(_)) | Some(StoreError::FileNotFound { .. }) => 3,
        Some(StoreError::DuplicateKey { .. }) => 4,
        Some(
            StoreError::SchemaMismatch(_)
            | StoreError::UnknownField(_)
            | StoreError::MissingField(_),
        ) => 2,
        Some(StoreError::Persistence { .. }) => 6,
        Some(StoreError::Import { .. }) | Some(StoreError::Malformed { .. }) => 7,
        None => 1,
    }
}

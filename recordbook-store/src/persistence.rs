use std::collections::hash_map::Entry;
use std::fs as std_fs;
use std::io;
use std::path::Path;

use recordbook_model::{Record, Value};
use recordbook_table::TableCodec;
use tracing::{debug, info, warn};

use crate::store::{build_index, read_table};
use crate::{fs, ImportSummary, RecordStore, StoreError, StoreResult};

impl<C: TableCodec> RecordStore<C> {
    /// Writes the schema and every record to the backing file.
    ///
    /// The file is replaced atomically; the index is never touched, so a
    /// failed save can simply be retried.
    pub fn save(&self) -> StoreResult<()> {
        self.write_records(&self.path, "save", self.index.values())?;
        info!(path = %self.path.display(), records = self.index.len(), "saved record store");
        Ok(())
    }

    /// Rebuilds schema and index from the backing file, discarding in-memory
    /// state. Nothing changes if the file cannot be read or decoded.
    pub fn load(&mut self) -> StoreResult<()> {
        let table = read_table(&self.codec, &self.path, "load")?;
        let (schema, index) = build_index(&self.path, table, &self.key_fields)?;
        self.schema = schema;
        self.index = index;
        info!(path = %self.path.display(), records = self.index.len(), "loaded record store");
        Ok(())
    }

    /// Empties the store and persists the empty state (header row only).
    ///
    /// The file is written first; if that fails the index keeps its records.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.write_records(&self.path, "clear", std::iter::empty())?;
        let removed = self.index.len();
        self.index.clear();
        info!(path = %self.path.display(), removed, "cleared record store");
        Ok(())
    }

    /// Copies the backing file as it is on disk to `dest`.
    ///
    /// Unsaved changes are not included; call [`save`](Self::save) first to
    /// capture them.
    pub fn backup(&self, dest: impl AsRef<Path>) -> StoreResult<()> {
        let dest = dest.as_ref();
        fs::copy_atomic(&self.path, dest, "backup")?;
        info!(path = %self.path.display(), dest = %dest.display(), "backed up record store");
        Ok(())
    }

    /// Replaces the backing file with `src` and reloads from it.
    ///
    /// `src` is decoded and checked against the key fields before anything is
    /// written, so a missing, malformed or mismatched backup leaves both the
    /// backing file and the index unchanged.
    pub fn restore(&mut self, src: impl AsRef<Path>) -> StoreResult<()> {
        let src = src.as_ref();
        let bytes = fs::read_bytes(src, "restore")?;
        let table = self
            .codec
            .decode(&mut bytes.as_slice())
            .map_err(|e| StoreError::from_table("restore", src, e))?;
        let (schema, index) = build_index(src, table, &self.key_fields)?;

        fs::write_atomic(&self.path, "restore", |file| {
            io::Write::write_all(file, &bytes)
                .map_err(|e| StoreError::persistence("restore", &self.path, e))
        })?;
        self.schema = schema;
        self.index = index;
        info!(
            path = %self.path.display(),
            src = %src.display(),
            records = self.index.len(),
            "restored record store"
        );
        Ok(())
    }

    /// Merges the rows of `src` into the store, skipping any row whose key is
    /// already present (in the store or earlier in `src`).
    ///
    /// Skips are not errors; they are counted in the returned summary.
    /// Columns of `src` outside the schema are ignored and schema columns
    /// missing from `src` are left empty. When at least one row was added the
    /// store is saved; the merge is staged so a failed save leaves the index
    /// as it was.
    pub fn import(&mut self, src: impl AsRef<Path>) -> StoreResult<ImportSummary> {
        let src = src.as_ref();
        let bytes = fs::read_bytes(src, "import")?;
        let table = self
            .codec
            .decode(&mut bytes.as_slice())
            .map_err(|e| match e.into_io() {
                Ok(io) => StoreError::persistence("import", src, io),
                Err(e) => StoreError::Import {
                    path: src.to_path_buf(),
                    reason: e.to_string(),
                },
            })?;

        if let Some(missing) = self
            .key_fields
            .fields()
            .iter()
            .find(|f| !table.columns().contains(f))
        {
            return Err(StoreError::Import {
                path: src.to_path_buf(),
                reason: format!("missing key column '{missing}'"),
            });
        }
        let ignored: Vec<&str> = table
            .columns()
            .iter()
            .filter(|c| !self.schema.contains(c))
            .map(String::as_str)
            .collect();
        if !ignored.is_empty() {
            warn!(src = %src.display(), columns = ?ignored, "ignoring columns outside the schema");
        }

        // Position of each schema field in the source, if present.
        let positions: Vec<Option<usize>> = self
            .schema
            .fields()
            .iter()
            .map(|f| table.columns().iter().position(|c| c == f))
            .collect();

        let mut staged = self.index.clone();
        let mut summary = ImportSummary::default();
        for (i, row) in table.rows().iter().enumerate() {
            let record: Record = self
                .schema
                .fields()
                .iter()
                .zip(&positions)
                .map(|(field, pos)| {
                    let value = pos.map_or(Value::Empty, |p| Value::infer(&row[p]));
                    (field.clone(), value)
                })
                .collect();
            let key = self.key_fields.key_of(&record)?;
            match staged.entry(key) {
                Entry::Occupied(entry) => {
                    debug!(row = i + 1, key = %entry.key(), "skipping duplicate row");
                    summary.skipped += 1;
                }
                Entry::Vacant(entry) => {
                    entry.insert(record);
                    summary.added += 1;
                }
            }
        }

        if summary.added > 0 {
            self.write_records(&self.path, "import", staged.values())?;
            self.index = staged;
        }
        info!(
            src = %src.display(),
            added = summary.added,
            skipped = summary.skipped,
            "imported records"
        );
        Ok(summary)
    }

    /// Writes the current index to `dest` with the store's codec. The backing
    /// file and index are untouched.
    pub fn export(&self, dest: impl AsRef<Path>) -> StoreResult<()> {
        let dest = dest.as_ref();
        self.write_records(dest, "export", self.index.values())?;
        info!(dest = %dest.display(), records = self.index.len(), "exported records");
        Ok(())
    }

    /// Deletes the backing file and drops the store. A file that was never
    /// written is not an error.
    pub fn destroy(self) -> StoreResult<()> {
        match std_fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::persistence("destroy", &self.path, e)),
        }
        info!(path = %self.path.display(), "destroyed record store");
        Ok(())
    }

    fn write_records<'a>(
        &self,
        dest: &Path,
        operation: &'static str,
        records: impl Iterator<Item = &'a Record>,
    ) -> StoreResult<()> {
        let table = self.to_table(dest, operation, records)?;
        fs::write_atomic(dest, operation, |file| {
            self.codec
                .encode(file, &table)
                .map_err(|e| StoreError::from_table(operation, dest, e))
        })
    }
}

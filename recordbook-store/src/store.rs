use std::collections::HashMap;
use std::path::{Path, PathBuf};

use recordbook_model::{Key, KeyFields, Record, Schema, Value};
use recordbook_table::{CsvCodec, Table, TableCodec};
use tracing::{debug, info, warn};

use crate::error::Lookup;
use crate::{fs, StoreError, StoreResult};

/// A hash-indexed set of records bound to one backing file.
///
/// The index maps each record's [`Key`] to the record and is the only
/// authoritative state; the schema describes it. Mutations touch the index
/// alone, and persistence is always an explicit call (`save`, or the
/// operations documented as saving: `clear`, `import`).
///
/// A store is single-owner: mutating methods take `&mut self`, and two stores
/// must not be bound to the same path at once.
#[derive(Debug)]
pub struct RecordStore<C: TableCodec = CsvCodec> {
    pub(crate) path: PathBuf,
    pub(crate) schema: Schema,
    pub(crate) key_fields: KeyFields,
    pub(crate) index: HashMap<Key, Record>,
    pub(crate) codec: C,
}

impl RecordStore<CsvCodec> {
    /// Opens the store at `path` with comma-separated encoding.
    ///
    /// See [`RecordStore::open_with`].
    pub fn open<I, S>(path: impl Into<PathBuf>, key_fields: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::open_with(path, key_fields, CsvCodec::new())
    }

    /// Creates a new comma-separated store. See [`RecordStore::create_with`].
    pub fn create<F, FS, K, KS>(path: impl Into<PathBuf>, fields: F, key_fields: K) -> StoreResult<Self>
    where
        F: IntoIterator<Item = FS>,
        FS: Into<String>,
        K: IntoIterator<Item = KS>,
        KS: Into<String>,
    {
        Self::create_with(path, fields, key_fields, CsvCodec::new())
    }
}

impl<C: TableCodec> RecordStore<C> {
    /// Opens the store at `path`.
    ///
    /// If the file exists its header becomes the schema and every row is
    /// indexed; a later row replaces an earlier one with the same key. If it
    /// does not exist the schema is just the key fields and the index is
    /// empty; extend the schema before the first save.
    ///
    /// Fails with [`StoreError::SchemaMismatch`] when the key-field list is
    /// empty or repeats a name, or when a key field is absent from the header.
    pub fn open_with<I, S>(path: impl Into<PathBuf>, key_fields: I, codec: C) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.into();
        let key_fields = KeyFields::new(key_fields)?;

        let (schema, index) = if fs::exists(&path, "open")? {
            let table = read_table(&codec, &path, "open")?;
            build_index(&path, table, &key_fields)?
        } else {
            debug!(path = %path.display(), "no backing file yet, starting empty");
            (key_fields.to_schema(), HashMap::new())
        };

        info!(
            path = %path.display(),
            fields = schema.len(),
            records = index.len(),
            "opened record store"
        );
        Ok(Self {
            path,
            schema,
            key_fields,
            index,
            codec,
        })
    }

    /// Creates an empty store with the full schema and writes its header to
    /// `path` straight away, replacing any existing file.
    pub fn create_with<F, FS, K, KS>(
        path: impl Into<PathBuf>,
        fields: F,
        key_fields: K,
        codec: C,
    ) -> StoreResult<Self>
    where
        F: IntoIterator<Item = FS>,
        FS: Into<String>,
        K: IntoIterator<Item = KS>,
        KS: Into<String>,
    {
        let schema = Schema::new(fields)?;
        let key_fields = KeyFields::new(key_fields)?;
        key_fields.check_against(&schema)?;

        let store = Self {
            path: path.into(),
            schema,
            key_fields,
            index: HashMap::new(),
            codec,
        };
        store.save()?;
        info!(path = %store.path.display(), fields = store.schema.len(), "created record store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn key_fields(&self) -> &KeyFields {
        &self.key_fields
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Records in index order (unspecified).
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.index.values()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Derives the key `record` would be stored under.
    pub fn key_of(&self, record: &Record) -> StoreResult<Key> {
        Ok(self.key_fields.key_of(record)?)
    }

    /// Inserts a new record covering every schema field.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if its key is taken. Does not
    /// save.
    pub fn add(&mut self, record: Record) -> StoreResult<Key> {
        self.schema.check(&record)?;
        let key = self.key_fields.key_of(&record)?;
        if self.index.contains_key(&key) {
            return Err(StoreError::DuplicateKey { key });
        }
        debug!(key = %key, "added record");
        self.index.insert(key.clone(), record);
        Ok(key)
    }

    /// Exact key lookup.
    pub fn search(&self, key: &Key) -> StoreResult<&Record> {
        self.index
            .get(key)
            .ok_or_else(|| StoreError::NotFound(Lookup::Key(key.clone())))
    }

    /// Every record whose `field` equals `value`. An empty result is not an
    /// error here.
    pub fn find_by_field(&self, field: &str, value: &Value) -> StoreResult<Vec<&Record>> {
        self.require_field(field)?;
        Ok(self
            .index
            .values()
            .filter(|r| r.get(field) == Some(value))
            .collect())
    }

    /// Removes the record at `key` and hands it back.
    pub fn delete_by_key(&mut self, key: &Key) -> StoreResult<Record> {
        let record = self
            .index
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(Lookup::Key(key.clone())))?;
        debug!(key = %key, "deleted record");
        Ok(record)
    }

    /// Removes every record whose `field` equals `value`, returning how many
    /// went. Zero matches is [`StoreError::NotFound`].
    pub fn delete_by_field(&mut self, field: &str, value: &Value) -> StoreResult<usize> {
        self.require_field(field)?;
        let before = self.index.len();
        self.index.retain(|_, r| r.get(field) != Some(value));
        let removed = before - self.index.len();
        if removed == 0 {
            return Err(StoreError::NotFound(Lookup::Field {
                field: field.to_string(),
                value: value.clone(),
            }));
        }
        debug!(field, value = %value, removed, "deleted records by field");
        Ok(removed)
    }

    /// Replaces the record at `old_key` with `record`, re-keying it when its
    /// key fields changed.
    ///
    /// All checks run before the index is touched: a missing `old_key`, an
    /// invalid record, or a new key that belongs to another record leaves the
    /// store as it was.
    pub fn edit(&mut self, old_key: &Key, record: Record) -> StoreResult<Key> {
        if !self.index.contains_key(old_key) {
            return Err(StoreError::NotFound(Lookup::Key(old_key.clone())));
        }
        self.schema.check(&record)?;
        let new_key = self.key_fields.key_of(&record)?;
        if new_key != *old_key && self.index.contains_key(&new_key) {
            return Err(StoreError::DuplicateKey { key: new_key });
        }

        self.index.remove(old_key);
        if new_key != *old_key {
            debug!(old = %old_key, new = %new_key, "re-keyed record");
        }
        self.index.insert(new_key.clone(), record);
        Ok(new_key)
    }

    /// Appends a column to the schema; existing records get an empty cell.
    pub fn extend_schema(&mut self, field: impl Into<String>) -> StoreResult<()> {
        let field = field.into();
        self.schema.push(field.clone())?;
        for record in self.index.values_mut() {
            record.set(field.clone(), Value::Empty);
        }
        debug!(field = %field, "extended schema");
        Ok(())
    }

    fn require_field(&self, field: &str) -> StoreResult<()> {
        if self.schema.contains(field) {
            Ok(())
        } else {
            Err(StoreError::UnknownField(field.to_string()))
        }
    }

    /// Builds the table for `records` under the current schema, for writing
    /// to `path`.
    pub(crate) fn to_table<'a>(
        &self,
        path: &Path,
        operation: &'static str,
        records: impl Iterator<Item = &'a Record>,
    ) -> StoreResult<Table> {
        let fail = |e| StoreError::from_table(operation, path, e);
        let mut table = Table::new(self.schema.fields().to_vec()).map_err(fail)?;
        for record in records {
            table.push_row(record.to_row(&self.schema)).map_err(fail)?;
        }
        Ok(table)
    }
}

/// Decodes the table at `path`.
pub(crate) fn read_table<C: TableCodec>(
    codec: &C,
    path: &Path,
    operation: &'static str,
) -> StoreResult<Table> {
    let bytes = fs::read_bytes(path, operation)?;
    codec
        .decode(&mut bytes.as_slice())
        .map_err(|e| StoreError::from_table(operation, path, e))
}

/// Turns a decoded table into a schema and index keyed by `key_fields`.
pub(crate) fn build_index(
    path: &Path,
    table: Table,
    key_fields: &KeyFields,
) -> StoreResult<(Schema, HashMap<Key, Record>)> {
    let schema = Schema::new(table.columns().iter().cloned())?;
    if let Err(e) = key_fields.check_against(&schema) {
        return Err(StoreError::SchemaMismatch(format!(
            "{e} (header of {})",
            path.display()
        )));
    }

    let columns = table.columns().to_vec();
    let mut index = HashMap::with_capacity(table.len());
    for row in table.into_rows() {
        let record = Record::from_row(&columns, &row);
        let key = key_fields.key_of(&record)?;
        if index.insert(key.clone(), record).is_some() {
            warn!(path = %path.display(), key = %key, "duplicate key in file, keeping the later row");
        }
    }
    Ok((schema, index))
}

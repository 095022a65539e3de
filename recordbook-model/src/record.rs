use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Schema, Value};

/// A mapping from field name to cell value.
///
/// A record carries no schema of its own; the store validates it against the
/// schema on every mutating call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets `field`, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a row of raw cells laid out in `columns` order,
    /// typing each cell with [`Value::infer`].
    pub fn from_row<S: AsRef<str>>(columns: &[String], cells: &[S]) -> Self {
        columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| (column.clone(), Value::infer(cell.as_ref())))
            .collect()
    }

    /// Renders the record as a row of cells in schema order. Fields the record
    /// lacks are written as empty cells.
    pub fn to_row(&self, schema: &Schema) -> Vec<String> {
        schema
            .fields()
            .iter()
            .map(|f| {
                self.fields
                    .get(f)
                    .map(|v| v.to_cell().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

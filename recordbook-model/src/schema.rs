use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Key, ModelError, ModelResult, Record};

/// Ordered, unique field names. Order is the column order of every file the
/// store writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Builds a schema, rejecting repeated field names.
    pub fn new<I, S>(fields: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = unique_fields(fields)?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Appends a column at the end of the schema.
    pub fn push(&mut self, field: impl Into<String>) -> ModelResult<()> {
        let field = field.into();
        if self.contains(&field) {
            return Err(ModelError::DuplicateField(field));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Checks that `record` names exactly the schema's fields.
    ///
    /// Unknown fields are reported before missing ones so a typo surfaces as
    /// the misspelled name rather than as the field it was meant to be.
    pub fn check(&self, record: &Record) -> ModelResult<()> {
        if let Some(unknown) = record.field_names().find(|name| !self.contains(name)) {
            return Err(ModelError::UnknownField(unknown.to_string()));
        }
        if let Some(missing) = self.fields.iter().find(|f| !record.contains(f)) {
            return Err(ModelError::MissingField(missing.clone()));
        }
        Ok(())
    }
}

/// The non-empty subset of the schema whose combined values identify a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFields {
    fields: Vec<String>,
}

impl KeyFields {
    pub fn new<I, S>(fields: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = unique_fields(fields)?;
        if fields.is_empty() {
            return Err(ModelError::NoKeyFields);
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Fails with the first key field that `schema` lacks.
    pub fn check_against(&self, schema: &Schema) -> ModelResult<()> {
        match self.fields.iter().find(|f| !schema.contains(f)) {
            Some(missing) => Err(ModelError::MissingKeyField(missing.clone())),
            None => Ok(()),
        }
    }

    /// Derives the key of `record`, in key-field order.
    pub fn key_of(&self, record: &Record) -> ModelResult<Key> {
        self.fields
            .iter()
            .map(|f| {
                record
                    .get(f)
                    .cloned()
                    .ok_or_else(|| ModelError::MissingField(f.clone()))
            })
            .collect::<ModelResult<Vec<_>>>()
            .map(Key::new)
    }

    /// A schema made of the key fields alone, used for stores that have no
    /// file yet.
    pub fn to_schema(&self) -> Schema {
        Schema {
            fields: self.fields.clone(),
        }
    }
}

fn unique_fields<I, S>(fields: I) -> ModelResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for field in fields {
        let field = field.into();
        if !seen.insert(field.clone()) {
            return Err(ModelError::DuplicateField(field));
        }
        out.push(field);
    }
    Ok(out)
}

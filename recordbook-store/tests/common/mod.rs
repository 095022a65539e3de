//! Shared test helpers for store tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use recordbook_store::{Record, RecordStore};
use tempfile::TempDir;

pub const FIELDS: [&str; 3] = ["Name", "Surname", "Phone"];

/// A scratch directory that lives as long as the returned handle.
pub fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("phonebook.csv");
    (dir, db)
}

pub fn person(name: &str, surname: &str, phone: &str) -> Record {
    Record::new()
        .with("Name", name)
        .with("Surname", surname)
        .with("Phone", phone)
}

/// An empty phonebook keyed by `Phone`, already written to disk.
pub fn phonebook(path: &Path) -> RecordStore {
    RecordStore::create(path, FIELDS, ["Phone"]).unwrap()
}

/// A phonebook holding `people`, saved.
pub fn phonebook_with(path: &Path, people: &[(&str, &str, &str)]) -> RecordStore {
    let mut store = phonebook(path);
    for (name, surname, phone) in people {
        store.add(person(name, surname, phone)).unwrap();
    }
    store.save().unwrap();
    store
}

pub fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

pub fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Records sorted by their cells so stores can be compared as sets.
pub fn sorted_rows(store: &RecordStore) -> Vec<Vec<String>> {
    let mut rows: Vec<_> = store
        .records()
        .map(|r| r.to_row(store.schema()))
        .collect();
    rows.sort();
    rows
}

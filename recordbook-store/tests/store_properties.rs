//! Property-based tests for the record store.
//!
//! These verify invariants that must hold after any sequence of operations:
//! - Add followed by Search returns the added record
//! - The index never holds two records with the same derived key
//! - Edit changes cardinality only as dictated by key changes
//! - Save followed by Load reproduces the index

mod common;

use std::collections::HashSet;

use common::{person, sorted_rows};
use proptest::prelude::*;
use recordbook_store::{Key, Record, RecordStore, StoreError};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn cell_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.\"+-]{0,12}").unwrap()
}

fn phone_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9+]{1,4}").unwrap()
}

fn person_strategy() -> impl Strategy<Value = Record> {
    (cell_strategy(), cell_strategy(), phone_strategy())
        .prop_map(|(name, surname, phone)| person(&name, &surname, &phone))
}

#[derive(Debug, Clone)]
enum Op {
    Add(Record),
    DeleteKey(String),
    Edit(String, Record),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        person_strategy().prop_map(Op::Add),
        phone_strategy().prop_map(Op::DeleteKey),
        (phone_strategy(), person_strategy()).prop_map(|(k, r)| Op::Edit(k, r)),
    ]
}

fn assert_keys_unique(store: &RecordStore) {
    let keys: Vec<Key> = store.records().map(|r| store.key_of(r).unwrap()).collect();
    let unique: HashSet<&Key> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
}

// =============================================================================
// INDEX PROPERTIES
// =============================================================================

proptest! {
    /// Add followed by Search by the record's key returns an equal record.
    #[test]
    fn add_then_search_returns_record(record in person_strategy()) {
        let (_dir, db) = common::scratch();
        let mut store = common::phonebook(&db);
        let key = store.add(record.clone()).unwrap();
        prop_assert_eq!(store.search(&key).unwrap(), &record);
    }

    /// No operation sequence can produce two records with equal keys.
    #[test]
    fn keys_stay_unique(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (_dir, db) = common::scratch();
        let mut store = common::phonebook(&db);
        for op in ops {
            let _ = match op {
                Op::Add(r) => store.add(r).map(|_| ()),
                Op::DeleteKey(k) => store.delete_by_key(&Key::from([k])).map(|_| ()),
                Op::Edit(k, r) => store.edit(&Key::from([k]), r).map(|_| ()),
            };
            assert_keys_unique(&store);
        }
    }

    /// Edit never changes cardinality; a re-key moves exactly one entry.
    #[test]
    fn edit_preserves_cardinality(
        records in prop::collection::vec(person_strategy(), 1..10),
        replacement in person_strategy(),
    ) {
        let (_dir, db) = common::scratch();
        let mut store = common::phonebook(&db);
        for r in records {
            let _ = store.add(r);
        }
        let old_key = store.key_of(store.records().next().unwrap()).unwrap();
        let new_key = store.key_of(&replacement).unwrap();
        let len = store.len();
        let new_key_taken = store.contains(&new_key);

        match store.edit(&old_key, replacement) {
            Ok(k) => {
                prop_assert_eq!(&k, &new_key);
                prop_assert_eq!(store.len(), len);
                prop_assert!(store.contains(&new_key));
                if new_key != old_key {
                    prop_assert!(!store.contains(&old_key));
                }
            }
            Err(StoreError::DuplicateKey { key }) => {
                prop_assert!(new_key_taken && new_key != old_key);
                prop_assert_eq!(key, new_key);
                prop_assert_eq!(store.len(), len);
                prop_assert!(store.contains(&old_key));
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

// =============================================================================
// PERSISTENCE PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Save then Load yields the same set of records.
    #[test]
    fn save_load_roundtrip(records in prop::collection::vec(person_strategy(), 0..20)) {
        let (_dir, db) = common::scratch();
        let mut store = common::phonebook(&db);
        for r in records {
            let _ = store.add(r);
        }
        let before = sorted_rows(&store);
        store.save().unwrap();

        store.load().unwrap();
        prop_assert_eq!(sorted_rows(&store), before.clone());

        let reopened = RecordStore::open(&db, ["Phone"]).unwrap();
        prop_assert_eq!(sorted_rows(&reopened), before);
    }

    /// Clear then Load yields an empty index.
    #[test]
    fn clear_then_load_is_empty(records in prop::collection::vec(person_strategy(), 0..10)) {
        let (_dir, db) = common::scratch();
        let mut store = common::phonebook(&db);
        for r in records {
            let _ = store.add(r);
        }
        store.clear().unwrap();
        store.load().unwrap();
        prop_assert!(store.is_empty());
        prop_assert_eq!(common::read_file(&db), "Name,Surname,Phone\n");
    }
}

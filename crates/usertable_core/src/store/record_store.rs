//! In-memory record store with mirror write-through.
//!
//! # Responsibility
//! - Own the canonical ordered list of records for one session.
//! - Apply confirmed mutations and write every change through to the mirror.
//!
//! # Invariants
//! - Order follows insertion; only appends add records.
//! - Keys are unique; `append` refuses a key that is already present.
//! - Missing keys in `remove_by_key`/`duplicate_by_key` are logged no-ops.
//! - Mirror failures are logged and never fail a mutation.

use crate::model::record::{Record, RecordKey};
use crate::repo::mirror_repo::MirrorRepository;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Single-owner state container for the session's records.
pub struct RecordStore<M: MirrorRepository> {
    records: Vec<Record>,
    mirror: M,
}

impl<M: MirrorRepository> RecordStore<M> {
    /// Creates an empty store writing through to `mirror`.
    pub fn new(mirror: M) -> Self {
        Self {
            records: Vec::new(),
            mirror,
        }
    }

    /// Seeds the store from the mirror, if a snapshot exists.
    ///
    /// Returns the number of rehydrated records. Unreadable snapshots are
    /// logged and leave the store untouched.
    pub fn rehydrate(&mut self) -> usize {
        match self.mirror.load_snapshot() {
            Ok(Some(records)) => {
                let count = records.len();
                self.records = records;
                info!(
                    "event=store_rehydrate module=store status=ok records={}",
                    count
                );
                count
            }
            Ok(None) => {
                debug!("event=store_rehydrate module=store status=empty");
                0
            }
            Err(err) => {
                warn!(
                    "event=store_rehydrate module=store status=error error={}",
                    err
                );
                0
            }
        }
    }

    /// Read-only snapshot of all records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record with `key`.
    pub fn find(&self, key: &RecordKey) -> Option<&Record> {
        self.records.iter().find(|record| record.key() == key)
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.find(key).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.records.iter().map(Record::key)
    }

    /// Backing mirror, e.g. for inspection in tests.
    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Builds a copy of the record with `key` under a key not yet in the store.
    ///
    /// Does not mutate the store. Returns `None` when `key` is absent.
    pub fn fresh_copy(&self, key: &RecordKey) -> Option<Record> {
        let source = self.find(key)?;
        let mut copy = source.duplicate();
        while self.contains_key(copy.key()) {
            copy = source.duplicate();
        }
        Some(copy)
    }

    /// Unconditionally replaces the collection.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        if let Some(key) = first_duplicate_key(&records) {
            warn!(
                "event=store_replace module=store status=warn reason=duplicate_key key={}",
                key
            );
        }
        self.records = records;
        self.write_through("replace_all");
    }

    /// Appends one record.
    ///
    /// Returns `false` without mutating when the key is already present.
    pub fn append(&mut self, record: Record) -> bool {
        if self.contains_key(record.key()) {
            warn!(
                "event=store_append module=store status=skipped reason=duplicate_key key={}",
                record.key()
            );
            return false;
        }
        self.records.push(record);
        self.write_through("append");
        true
    }

    /// Removes the record with `key`.
    ///
    /// Returns `None` and leaves the collection unchanged when absent.
    pub fn remove_by_key(&mut self, key: &RecordKey) -> Option<Record> {
        let Some(index) = self.records.iter().position(|record| record.key() == key) else {
            warn!(
                "event=store_remove module=store status=skipped reason=not_found key={}",
                key
            );
            return None;
        };
        let removed = self.records.remove(index);
        self.write_through("remove_by_key");
        Some(removed)
    }

    /// Appends a copy of the record with `key` under a fresh key.
    ///
    /// Returns the new record, or `None` when `key` is absent.
    pub fn duplicate_by_key(&mut self, key: &RecordKey) -> Option<Record> {
        let Some(copy) = self.fresh_copy(key) else {
            warn!(
                "event=store_duplicate module=store status=skipped reason=not_found key={}",
                key
            );
            return None;
        };
        self.records.push(copy.clone());
        self.write_through("duplicate_by_key");
        Some(copy)
    }

    fn write_through(&self, operation: &str) {
        match self.mirror.save_snapshot(&self.records) {
            Ok(()) => debug!(
                "event=mirror_write module=store status=ok op={} records={}",
                operation,
                self.records.len()
            ),
            Err(err) => warn!(
                "event=mirror_write module=store status=error op={} error={}",
                operation, err
            ),
        }
    }
}

fn first_duplicate_key(records: &[Record]) -> Option<RecordKey> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .find(|record| !seen.insert(record.key()))
        .map(|record| record.key().clone())
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::model::record::{Record, RecordKey};
    use crate::repo::mirror_repo::{MirrorError, MirrorRepository, MirrorResult};
    use serde_json::json;
    use std::cell::RefCell;

    /// Counts writes; optionally fails every call.
    #[derive(Default)]
    struct CountingMirror {
        writes: RefCell<usize>,
        fail: bool,
    }

    impl MirrorRepository for CountingMirror {
        fn save_snapshot(&self, _records: &[Record]) -> MirrorResult<()> {
            *self.writes.borrow_mut() += 1;
            if self.fail {
                return Err(MirrorError::Serde(
                    serde_json::from_str::<u8>("x").unwrap_err(),
                ));
            }
            Ok(())
        }

        fn load_snapshot(&self) -> MirrorResult<Option<Vec<Record>>> {
            Ok(None)
        }

        fn clear_snapshot(&self) -> MirrorResult<()> {
            Ok(())
        }
    }

    fn record(key: &str, name: &str) -> Record {
        Record::with_key(
            RecordKey::new(key).unwrap(),
            json!({ "name": name }).as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn remove_missing_key_is_noop_without_write() {
        let mut store = RecordStore::new(CountingMirror::default());
        store.replace_all(vec![record("a", "Alice"), record("b", "Bob")]);
        let before = store.records().to_vec();

        assert!(store.remove_by_key(&RecordKey::new("z").unwrap()).is_none());
        assert_eq!(store.records(), before.as_slice());
        assert_eq!(*store.mirror().writes.borrow(), 1);
    }

    #[test]
    fn append_refuses_duplicate_key() {
        let mut store = RecordStore::new(CountingMirror::default());
        assert!(store.append(record("a", "Alice")));
        assert!(!store.append(record("a", "Other")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].field("name"), Some(&json!("Alice")));
    }

    #[test]
    fn duplicate_copies_fields_under_new_key() {
        let mut store = RecordStore::new(CountingMirror::default());
        store.append(record("a", "Alice"));

        let copy = store
            .duplicate_by_key(&RecordKey::new("a").unwrap())
            .unwrap();
        assert_ne!(copy.key().as_str(), "a");
        assert_eq!(copy.fields(), store.records()[0].fields());
        assert_eq!(store.records()[1], copy);
        assert!(store.duplicate_by_key(&RecordKey::new("nope").unwrap()).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn fresh_copy_leaves_store_untouched() {
        let mut store = RecordStore::new(CountingMirror::default());
        store.append(record("a", "Alice"));

        let copy = store.fresh_copy(&RecordKey::new("a").unwrap()).unwrap();
        assert!(!store.contains_key(copy.key()));
        assert_eq!(copy.field("name"), Some(&json!("Alice")));
        assert_eq!(store.len(), 1);
        assert_eq!(*store.mirror().writes.borrow(), 1);
        assert!(store.fresh_copy(&RecordKey::new("z").unwrap()).is_none());
    }

    #[test]
    fn replace_all_keeps_duplicate_keys_as_given() {
        let mut store = RecordStore::new(CountingMirror::default());
        let incoming = vec![record("a", "Alice"), record("a", "Alias")];

        store.replace_all(incoming.clone());
        assert_eq!(store.records(), incoming.as_slice());
        assert_eq!(*store.mirror().writes.borrow(), 1);
    }

    #[test]
    fn mirror_failure_does_not_block_mutation() {
        let mut store = RecordStore::new(CountingMirror {
            fail: true,
            ..CountingMirror::default()
        });
        assert!(store.append(record("a", "Alice")));
        assert_eq!(store.len(), 1);
        assert_eq!(*store.mirror().writes.borrow(), 1);
    }
}

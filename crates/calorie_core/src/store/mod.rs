//! Persistence layer: key-value backends and the typed day store.
//!
//! # Responsibility
//! - Define the `KeyValueStore` contract that backends implement.
//! - Provide an in-memory backend and a SQLite-backed one.
//! - Map day state to text keys via `DayStore`.
//!
//! # Invariants
//! - Backends store opaque text; only `DayStore` knows value encodings.
//! - Backend errors are transport errors; decoding never fails toward callers.
//! - Batch writes (`set_many`, `replace_all`) apply completely or not at all.

use crate::db::DbError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod day_store;
pub mod sqlite_kv;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure while reading or writing persisted values.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection schema is not at the version this binary expects.
    SchemaNotReady {
        db_version: u32,
        expected: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady {
                db_version,
                expected,
            } => write!(
                f,
                "store schema version {db_version} does not match expected {expected}; open the database through db::open_db"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Text key-value storage scoped to one device profile.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Writes every pair, or none of them when any write fails.
    fn set_many(&mut self, values: &[(&str, &str)]) -> StoreResult<()>;
    /// Erases every key unconditionally.
    fn clear(&mut self) -> StoreResult<()>;
    /// Erases every key and writes `values` as one all-or-nothing step.
    fn replace_all(&mut self, values: &[(&str, &str)]) -> StoreResult<()>;
}

/// Process-local backend; never fails. Used by tests and embedders that
/// persist elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyValueStore {
    values: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&mut self, values: &[(&str, &str)]) -> StoreResult<()> {
        for &(key, value) in values {
            self.values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.values.clear();
        Ok(())
    }

    fn replace_all(&mut self, values: &[(&str, &str)]) -> StoreResult<()> {
        self.values.clear();
        self.set_many(values)
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn memory_store_overwrites_and_clears() {
        let mut store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_replace_all_drops_unlisted_keys() {
        let mut store = MemoryKeyValueStore::new();
        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();

        store.replace_all(&[("b", "3")]).unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));
        assert_eq!(store.len(), 1);
    }
}

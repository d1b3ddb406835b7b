//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist day-state text values in the `kv_entries` table.
//!
//! # Invariants
//! - The borrowed connection must come from `db::open_db*` so migrations ran.
//! - `set` is an upsert; one row per key.
//! - Batch writes run in one transaction.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::migrations::{current_version, latest_version};
use rusqlite::{params, Connection, OptionalExtension};

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = (strftime('%s', 'now') * 1000);";

/// Key-value backend over a borrowed SQLite connection.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection after checking its schema is fully migrated.
    ///
    /// # Errors
    /// - `StoreError::SchemaNotReady` when `PRAGMA user_version` is not the
    ///   latest migration version.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let db_version = current_version(conn)?;
        let expected = latest_version();
        if db_version != expected {
            return Err(StoreError::SchemaNotReady {
                db_version,
                expected,
            });
        }

        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn set_many(&mut self, values: &[(&str, &str)]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for &(key, value) in values {
            tx.execute(UPSERT_SQL, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }

    fn replace_all(&mut self, values: &[(&str, &str)]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM kv_entries;", [])?;
        for &(key, value) in values {
            tx.execute(UPSERT_SQL, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }
}

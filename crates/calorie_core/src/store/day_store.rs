//! Typed day-state persistence over a key-value backend.
//!
//! # Responsibility
//! - Encode limit/total as text numbers and entry lists as JSON arrays.
//! - Return documented defaults for absent or undecodable values.
//!
//! # Invariants
//! - Getters never fail: absent keys, corrupt text and backend read errors all
//!   yield the default (limit=2000, total=0, lists empty).
//! - A negative stored limit decodes to the default limit.
//! - Writes surface backend errors unchanged.
//! - A list element that does not decode is dropped; its siblings survive.
//! - Multi-key updates go through one backend batch write.

use super::{KeyValueStore, StoreResult};
use crate::model::day::DEFAULT_CALORIE_LIMIT;
use crate::model::entry::{Entry, EntryId, EntryKind};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const LIMIT_KEY: &str = "calorieLimit";
pub const TOTAL_KEY: &str = "totalCalorie";
pub const MEALS_KEY: &str = "meals";
pub const WORKOUTS_KEY: &str = "workouts";

/// Reason a persisted value could not be decoded. Logged, never returned.
#[derive(Debug)]
enum StorageDecodeError {
    NotANumber(String),
    NegativeLimit(f64),
    InvalidList(serde_json::Error),
}

impl Display for StorageDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber(text) => write!(f, "not a finite number: `{text}`"),
            Self::NegativeLimit(value) => write!(f, "negative limit: {value}"),
            Self::InvalidList(err) => write!(f, "invalid entry list: {err}"),
        }
    }
}

impl Error for StorageDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidList(err) => Some(err),
            _ => None,
        }
    }
}

/// Persistent store for the current-day snapshot.
pub struct DayStore<K: KeyValueStore> {
    backend: K,
}

impl<K: KeyValueStore> DayStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn into_backend(self) -> K {
        self.backend
    }

    pub fn limit(&self) -> f64 {
        let Some(text) = self.read_raw(LIMIT_KEY) else {
            return DEFAULT_CALORIE_LIMIT;
        };
        let decoded = decode_number(&text).and_then(|value| {
            if value < 0.0 {
                Err(StorageDecodeError::NegativeLimit(value))
            } else {
                Ok(value)
            }
        });
        or_default(LIMIT_KEY, decoded, DEFAULT_CALORIE_LIMIT)
    }

    pub fn set_limit(&mut self, limit: f64) -> StoreResult<()> {
        self.backend.set(LIMIT_KEY, &encode_number(limit))
    }

    pub fn total(&self) -> f64 {
        match self.read_raw(TOTAL_KEY) {
            Some(text) => or_default(TOTAL_KEY, decode_number(&text), 0.0),
            None => 0.0,
        }
    }

    pub fn set_total(&mut self, total: f64) -> StoreResult<()> {
        self.backend.set(TOTAL_KEY, &encode_number(total))
    }

    pub fn meals(&self) -> Vec<Entry> {
        self.entries(EntryKind::Meal)
    }

    pub fn save_meal(&mut self, meal: &Entry) -> StoreResult<()> {
        self.save_entry(EntryKind::Meal, meal)
    }

    /// Removes every persisted meal with `id`; returns how many were removed.
    pub fn remove_meal(&mut self, id: &EntryId) -> StoreResult<usize> {
        self.remove_entry(EntryKind::Meal, id)
    }

    pub fn workouts(&self) -> Vec<Entry> {
        self.entries(EntryKind::Workout)
    }

    pub fn save_workout(&mut self, workout: &Entry) -> StoreResult<()> {
        self.save_entry(EntryKind::Workout, workout)
    }

    /// Removes every persisted workout with `id`; returns how many were removed.
    pub fn remove_workout(&mut self, id: &EntryId) -> StoreResult<usize> {
        self.remove_entry(EntryKind::Workout, id)
    }

    pub fn entries(&self, kind: EntryKind) -> Vec<Entry> {
        let key = list_key(kind);
        match self.read_raw(key) {
            Some(text) => or_default(key, decode_entries(key, &text), Vec::new()),
            None => Vec::new(),
        }
    }

    /// Appends `entry` to the persisted list for `kind`.
    ///
    /// A corrupt list is replaced by a list holding only `entry`.
    pub fn save_entry(&mut self, kind: EntryKind, entry: &Entry) -> StoreResult<()> {
        let mut entries = self.entries(kind);
        entries.push(entry.clone());
        self.write_entries(kind, &entries)
    }

    pub fn remove_entry(&mut self, kind: EntryKind, id: &EntryId) -> StoreResult<usize> {
        let mut entries = self.entries(kind);
        let before = entries.len();
        entries.retain(|entry| entry.id() != id);
        let removed = before - entries.len();

        if removed > 0 {
            self.write_entries(kind, &entries)?;
        }
        Ok(removed)
    }

    /// Appends `entry` and stores the new running `total` in one batch.
    pub fn save_entry_with_total(
        &mut self,
        kind: EntryKind,
        entry: &Entry,
        total: f64,
    ) -> StoreResult<()> {
        let mut entries = self.entries(kind);
        entries.push(entry.clone());
        let list = encode_entries(&entries);
        let total = encode_number(total);
        self.backend
            .set_many(&[(list_key(kind), list.as_str()), (TOTAL_KEY, total.as_str())])
    }

    /// Removes every entry with `id` and stores `total` in one batch.
    ///
    /// Both keys are written even when the persisted list had no match.
    pub fn remove_entry_with_total(
        &mut self,
        kind: EntryKind,
        id: &EntryId,
        total: f64,
    ) -> StoreResult<usize> {
        let mut entries = self.entries(kind);
        let before = entries.len();
        entries.retain(|entry| entry.id() != id);
        let removed = before - entries.len();

        let list = encode_entries(&entries);
        let total = encode_number(total);
        self.backend
            .set_many(&[(list_key(kind), list.as_str()), (TOTAL_KEY, total.as_str())])?;
        Ok(removed)
    }

    /// Erases all persisted keys, including the limit.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.clear()
    }

    /// Erases everything except `limit`, which is written back in the same step.
    pub fn clear_keeping_limit(&mut self, limit: f64) -> StoreResult<()> {
        let limit = encode_number(limit);
        self.backend.replace_all(&[(LIMIT_KEY, limit.as_str())])
    }

    fn write_entries(&mut self, kind: EntryKind, entries: &[Entry]) -> StoreResult<()> {
        self.backend.set(list_key(kind), &encode_entries(entries))
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=store_read module=store status=error key={} error={}",
                    key, err
                );
                None
            }
        }
    }
}

fn or_default<T>(key: &str, decoded: Result<T, StorageDecodeError>, default: T) -> T {
    decoded.unwrap_or_else(|err| {
        warn!(
            "event=store_decode module=store status=fallback key={} error={}",
            key, err
        );
        default
    })
}

fn list_key(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Meal => MEALS_KEY,
        EntryKind::Workout => WORKOUTS_KEY,
    }
}

fn encode_number(value: f64) -> String {
    value.to_string()
}

fn decode_number(text: &str) -> Result<f64, StorageDecodeError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| StorageDecodeError::NotANumber(text.to_string()))
}

fn encode_entries(entries: &[Entry]) -> String {
    // String keys and plain fields only; serde_json has no error path for these.
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
}

fn decode_entries(key: &str, text: &str) -> Result<Vec<Entry>, StorageDecodeError> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(StorageDecodeError::InvalidList)?;

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Entry>(item) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(
                "event=store_decode module=store status=skipped key={} index={} error={}",
                key, index, err
            ),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::{
        decode_entries, decode_number, encode_entries, encode_number, DayStore, LIMIT_KEY,
        MEALS_KEY,
    };
    use crate::model::entry::{Entry, EntryId};
    use crate::store::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn numbers_use_shortest_text_form() {
        assert_eq!(encode_number(2000.0), "2000");
        assert_eq!(encode_number(1.5), "1.5");
        assert_eq!(encode_number(-400.0), "-400");
    }

    #[test]
    fn decode_number_rejects_non_finite_text() {
        assert_eq!(decode_number(" 42 ").unwrap(), 42.0);
        assert!(decode_number("abc").is_err());
        assert!(decode_number("").is_err());
        assert!(decode_number("NaN").is_err());
        assert!(decode_number("inf").is_err());
    }

    #[test]
    fn negative_limit_decodes_to_default() {
        let mut backend = MemoryKeyValueStore::new();
        backend.set(LIMIT_KEY, "-5").unwrap();
        assert_eq!(DayStore::new(backend).limit(), 2000.0);
    }

    #[test]
    fn decode_entries_skips_only_bad_elements() {
        let decoded = decode_entries(
            MEALS_KEY,
            r#"[{"id":"a","name":"Eggs","calories":300},{"id":"b"},7]"#,
        )
        .unwrap();
        assert_eq!(decoded, vec![Entry::with_id(EntryId::new("a"), "Eggs", 300.0)]);
        assert!(decode_entries(MEALS_KEY, r#"{"id":"a"}"#).is_err());
    }

    #[test]
    fn save_entry_replaces_corrupt_list() {
        let mut backend = MemoryKeyValueStore::new();
        backend.set(MEALS_KEY, "{not json").unwrap();
        let mut store = DayStore::new(backend);

        let meal = Entry::with_id(EntryId::new("m-1"), "Toast", 120.0);
        store.save_meal(&meal).unwrap();

        assert_eq!(store.meals(), vec![meal.clone()]);
        assert_eq!(
            store.backend().get(MEALS_KEY).unwrap(),
            Some(encode_entries(&[meal]))
        );
    }
}

//! Entry domain model.
//!
//! # Responsibility
//! - Define the calorie-bearing record shared by meals and workouts.
//! - Generate collision-improbable entry IDs at creation time.
//!
//! # Invariants
//! - An `Entry` is immutable once created; fields are read through accessors.
//! - IDs are unique within one collection (meals and workouts are separate
//!   ID spaces). Uniqueness is enforced by the tracker when an entry is added.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ID_SUFFIX_LEN: usize = 7;
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Entry identifier in `<unix-millis>-<7 base36 chars>` form.
///
/// Not cryptographically unique; the random suffix only makes collisions
/// between entries created in the same millisecond improbable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wraps an existing ID, e.g. one read back from storage or typed by a user.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh time+random composite ID.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let random = Uuid::new_v4();
        let suffix = random
            .as_bytes()
            .iter()
            .take(ID_SUFFIX_LEN)
            .map(|byte| char::from(ID_ALPHABET[usize::from(*byte) % ID_ALPHABET.len()]))
            .collect::<String>();

        Self(format!("{millis}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Calories consumed.
    Meal,
    /// Calories burned.
    Workout,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Workout => "workout",
        }
    }

    /// Sign this kind applies to the running calorie balance.
    pub fn balance_sign(self) -> f64 {
        match self {
            Self::Meal => 1.0,
            Self::Workout => -1.0,
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A named calorie-bearing record (meal or workout).
///
/// Serialized as `{ "id", "name", "calories" }`, the layout used by the
/// persisted `meals` / `workouts` lists. JSON has no non-finite numbers, so
/// such calories are written as `null` and read back as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    id: EntryId,
    name: String,
    #[serde(deserialize_with = "calories_or_zero")]
    calories: f64,
}

fn calories_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Entry {
    /// Creates an entry with a freshly generated ID.
    ///
    /// No validation happens here; input checks belong to the command adapter.
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self::with_id(EntryId::generate(), name, calories)
    }

    /// Creates an entry with a caller-provided ID.
    pub fn with_id(id: EntryId, name: impl Into<String>, calories: f64) -> Self {
        Self {
            id,
            name: name.into(),
            calories,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    /// Case-insensitive substring match on the entry name.
    ///
    /// An empty (or whitespace-only) query matches every entry.
    pub fn name_matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty() || self.name.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryId, EntryKind};

    #[test]
    fn generated_ids_have_time_and_random_parts() {
        let id = EntryId::generate();
        let (millis, suffix) = id
            .as_str()
            .split_once('-')
            .expect("generated id should contain a separator");

        assert!(millis.parse::<u128>().is_ok());
        assert_eq!(suffix.len(), 7);
        assert!(suffix
            .chars()
            .all(|ch| ch.is_ascii_digit() || ch.is_ascii_lowercase()));
    }

    #[test]
    fn generated_ids_do_not_repeat_in_a_burst() {
        let ids = (0..256)
            .map(|_| EntryId::generate())
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn name_matching_ignores_case_and_blank_queries() {
        let entry = Entry::new("Chicken Salad", 450.0);

        assert!(entry.name_matches("salad"));
        assert!(entry.name_matches("CHICK"));
        assert!(entry.name_matches("  "));
        assert!(!entry.name_matches("burger"));
    }

    #[test]
    fn null_calories_read_back_as_zero() {
        let entry = Entry::with_id(EntryId::new("m1"), "Mystery", f64::INFINITY);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"id":"m1","name":"Mystery","calories":null}"#);

        let decoded: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Entry::with_id(EntryId::new("m1"), "Mystery", 0.0));
        assert!(serde_json::from_str::<Entry>(r#"{"id":"m1","name":"x","calories":"a"}"#).is_err());
    }

    #[test]
    fn balance_sign_follows_kind() {
        assert_eq!(EntryKind::Meal.balance_sign(), 1.0);
        assert_eq!(EntryKind::Workout.balance_sign(), -1.0);
    }
}

//! Input adapter: raw form values to validated tracker commands.
//!
//! # Responsibility
//! - Reject empty names and empty, non-numeric or negative calorie/limit
//!   input before anything reaches the tracker.
//! - Map one user action to one tracker call.
//!
//! # Invariants
//! - A `Command` only carries validated values; the tracker trusts them.

use crate::model::entry::{Entry, EntryId, EntryKind};
use crate::service::tracker::{DayTracker, TrackerResult};
use crate::service::view::ViewRenderer;
use crate::store::KeyValueStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// User input that cannot become a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingNameAndCalories,
    MissingName,
    MissingCalories,
    InvalidCalories(String),
    MissingLimit,
    InvalidLimit(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNameAndCalories => write!(f, "please fill out both name and calories"),
            Self::MissingName => write!(f, "please fill out a name"),
            Self::MissingCalories => write!(f, "please fill out calories"),
            Self::InvalidCalories(value) => {
                write!(f, "calories must be a non-negative number, got `{value}`")
            }
            Self::MissingLimit => write!(f, "please fill out the calorie limit"),
            Self::InvalidLimit(value) => {
                write!(f, "calorie limit must be a non-negative number, got `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// One user action, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddMeal(Entry),
    AddWorkout(Entry),
    RemoveMeal(EntryId),
    RemoveWorkout(EntryId),
    SetLimit(f64),
    ResetDay,
}

impl Command {
    pub fn add(kind: EntryKind, entry: Entry) -> Self {
        match kind {
            EntryKind::Meal => Self::AddMeal(entry),
            EntryKind::Workout => Self::AddWorkout(entry),
        }
    }

    pub fn remove(kind: EntryKind, id: EntryId) -> Self {
        match kind {
            EntryKind::Meal => Self::RemoveMeal(id),
            EntryKind::Workout => Self::RemoveWorkout(id),
        }
    }

    /// Dispatches this command to the tracker.
    pub fn apply<K, V>(self, tracker: &mut DayTracker<K, V>) -> TrackerResult<()>
    where
        K: KeyValueStore,
        V: ViewRenderer,
    {
        match self {
            Self::AddMeal(entry) => tracker.add_meal(entry),
            Self::AddWorkout(entry) => tracker.add_workout(entry),
            Self::RemoveMeal(id) => tracker.remove_meal(&id).map(|_| ()),
            Self::RemoveWorkout(id) => tracker.remove_workout(&id).map(|_| ()),
            Self::SetLimit(limit) => tracker.set_limit(limit),
            Self::ResetDay => tracker.reset_day(),
        }
    }
}

/// Builds a new entry from form text.
///
/// The name is trimmed; calories must parse as a finite, non-negative number.
pub fn entry_from_input(name: &str, calories: &str) -> Result<Entry, ValidationError> {
    let name = name.trim();
    let calories_text = calories.trim();

    match (name.is_empty(), calories_text.is_empty()) {
        (true, true) => return Err(ValidationError::MissingNameAndCalories),
        (true, false) => return Err(ValidationError::MissingName),
        (false, true) => return Err(ValidationError::MissingCalories),
        (false, false) => {}
    }

    let calories = parse_non_negative(calories_text)
        .ok_or_else(|| ValidationError::InvalidCalories(calories_text.to_string()))?;
    Ok(Entry::new(name, calories))
}

/// Parses a calorie limit from form text.
pub fn limit_from_input(value: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingLimit);
    }
    parse_non_negative(trimmed).ok_or_else(|| ValidationError::InvalidLimit(trimmed.to_string()))
}

fn parse_non_negative(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

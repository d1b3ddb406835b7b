//! Current-day snapshot and derived display values.
//!
//! # Invariants
//! - `DayState::total_calories` equals `consumed - burned` after every
//!   tracker mutation.
//! - `DerivedTotals` is always computed from entry lists, never patched
//!   incrementally.

use crate::model::entry::{Entry, EntryKind};
use serde::{Deserialize, Serialize};

/// Limit used when none has ever been set.
pub const DEFAULT_CALORIE_LIMIT: f64 = 2000.0;

/// Complete in-memory snapshot for the current day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayState {
    pub calorie_limit: f64,
    /// Signed running balance: meals add, workouts subtract.
    pub total_calories: f64,
    pub meals: Vec<Entry>,
    pub workouts: Vec<Entry>,
}

impl Default for DayState {
    fn default() -> Self {
        Self {
            calorie_limit: DEFAULT_CALORIE_LIMIT,
            total_calories: 0.0,
            meals: Vec::new(),
            workouts: Vec::new(),
        }
    }
}

impl DayState {
    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Meal => &self.meals,
            EntryKind::Workout => &self.workouts,
        }
    }

    pub(crate) fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Meal => &mut self.meals,
            EntryKind::Workout => &mut self.workouts,
        }
    }

    /// Balance implied by the entry lists alone.
    pub fn computed_total(&self) -> f64 {
        sum_calories(&self.meals) - sum_calories(&self.workouts)
    }

    pub fn derived_totals(&self) -> DerivedTotals {
        DerivedTotals::from_entries(self.calorie_limit, &self.meals, &self.workouts)
    }
}

/// Values pushed to the view after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedTotals {
    pub limit: f64,
    /// Sum of meal calories.
    pub consumed: f64,
    /// Sum of workout calories.
    pub burned: f64,
    /// `consumed - burned`.
    pub net: f64,
    /// `limit - consumed`; negative once the limit is exceeded.
    pub remaining: f64,
    /// `consumed > limit` (strict).
    pub over_limit: bool,
}

impl DerivedTotals {
    pub fn from_entries(limit: f64, meals: &[Entry], workouts: &[Entry]) -> Self {
        let consumed = sum_calories(meals);
        let burned = sum_calories(workouts);

        Self {
            limit,
            consumed,
            burned,
            net: consumed - burned,
            remaining: limit - consumed,
            over_limit: consumed > limit,
        }
    }

    /// Share of the limit consumed, as a percentage clamped to `[0, 100]`.
    ///
    /// A zero limit reads as full once anything has been eaten.
    pub fn progress_percent(&self) -> f64 {
        if self.consumed <= 0.0 {
            return 0.0;
        }
        if self.limit <= 0.0 {
            return 100.0;
        }
        (self.consumed / self.limit * 100.0).clamp(0.0, 100.0)
    }
}

fn sum_calories(entries: &[Entry]) -> f64 {
    entries.iter().map(Entry::calories).sum()
}

#[cfg(test)]
mod tests {
    use super::{DayState, DerivedTotals, DEFAULT_CALORIE_LIMIT};
    use crate::model::entry::Entry;

    #[test]
    fn default_state_is_empty_with_default_limit() {
        let state = DayState::default();
        assert_eq!(state.calorie_limit, DEFAULT_CALORIE_LIMIT);
        assert_eq!(state.total_calories, 0.0);
        assert!(state.meals.is_empty());
        assert!(state.workouts.is_empty());
    }

    #[test]
    fn totals_use_strict_over_limit_comparison() {
        let meals = vec![Entry::new("Lunch", 1500.0)];
        let at_limit = DerivedTotals::from_entries(1500.0, &meals, &[]);
        assert_eq!(at_limit.remaining, 0.0);
        assert!(!at_limit.over_limit);

        let over = DerivedTotals::from_entries(1499.0, &meals, &[]);
        assert!(over.over_limit);
    }

    #[test]
    fn progress_percent_is_clamped() {
        let meals = vec![Entry::new("Feast", 3000.0)];
        assert_eq!(
            DerivedTotals::from_entries(2000.0, &meals, &[]).progress_percent(),
            100.0
        );
        assert_eq!(
            DerivedTotals::from_entries(2000.0, &[], &[]).progress_percent(),
            0.0
        );
        assert_eq!(
            DerivedTotals::from_entries(0.0, &meals, &[]).progress_percent(),
            100.0
        );

        let half = vec![Entry::new("Snack", 500.0)];
        assert_eq!(
            DerivedTotals::from_entries(1000.0, &half, &[]).progress_percent(),
            50.0
        );
    }

    #[test]
    fn net_subtracts_workouts() {
        let meals = vec![Entry::new("Eggs", 300.0)];
        let workouts = vec![Entry::new("Run", 400.0)];
        let totals = DerivedTotals::from_entries(2000.0, &meals, &workouts);
        assert_eq!(totals.net, -100.0);
        assert_eq!(totals.burned, 400.0);
        assert_eq!(totals.remaining, 1700.0);
    }
}

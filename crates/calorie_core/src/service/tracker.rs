//! Day tracker use-case service.
//!
//! # Responsibility
//! - Own the current-day snapshot and be its only mutator.
//! - Write every change through to `DayStore`.
//! - Push derived totals and entry changes to a `ViewRenderer`.
//!
//! # Invariants
//! - `total_calories == Σ meals - Σ workouts` after load and after every
//!   successful mutation.
//! - Each mutation persists first, then updates memory, then emits. Keys that
//!   change together are written in one batch, so a failed write leaves both
//!   memory and the store untouched.
//! - Entry IDs are unique per collection; duplicates are rejected on add.
//! - `reset_day` keeps the calorie limit.

use crate::model::day::{DayState, DerivedTotals};
use crate::model::entry::{Entry, EntryId, EntryKind};
use crate::service::view::ViewRenderer;
use crate::store::day_store::DayStore;
use crate::store::{KeyValueStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TOTAL_DRIFT_TOLERANCE: f64 = 1e-6;

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug)]
pub enum TrackerError {
    /// Persisting the change failed; in-memory state is unchanged.
    Store(StoreError),
    /// An entry with this ID already exists in the same collection.
    DuplicateEntry { kind: EntryKind, id: EntryId },
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::DuplicateEntry { kind, id } => write!(f, "duplicate {kind} id: {id}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::DuplicateEntry { .. } => None,
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Sole mutator of the current-day state.
pub struct DayTracker<K: KeyValueStore, V: ViewRenderer> {
    store: DayStore<K>,
    view: V,
    state: DayState,
}

impl<K: KeyValueStore, V: ViewRenderer> DayTracker<K, V> {
    /// Loads the day snapshot from `store` and renders it into `view`.
    ///
    /// A stored total that disagrees with the stored lists (e.g. a write
    /// interrupted between the total and the list) is replaced by the total
    /// derived from the lists.
    pub fn load(store: DayStore<K>, view: V) -> Self {
        let mut state = DayState {
            calorie_limit: store.limit(),
            total_calories: store.total(),
            meals: store.meals(),
            workouts: store.workouts(),
        };

        let computed = state.computed_total();
        if (state.total_calories - computed).abs() > TOTAL_DRIFT_TOLERANCE {
            warn!(
                "event=tracker_load module=tracker status=reconciled stored_total={} computed_total={}",
                state.total_calories, computed
            );
            state.total_calories = computed;
        }

        info!(
            "event=tracker_load module=tracker status=ok meals={} workouts={} limit={}",
            state.meals.len(),
            state.workouts.len(),
            state.calorie_limit
        );

        let mut tracker = Self { store, view, state };
        tracker.load_items();
        tracker
    }

    /// Replays every entry and the totals to the view.
    pub fn load_items(&mut self) {
        for meal in &self.state.meals {
            self.view.append_entry(EntryKind::Meal, meal);
        }
        for workout in &self.state.workouts {
            self.view.append_entry(EntryKind::Workout, workout);
        }
        self.render();
    }

    pub fn add_meal(&mut self, meal: Entry) -> TrackerResult<()> {
        self.add_entry(EntryKind::Meal, meal)
    }

    pub fn add_workout(&mut self, workout: Entry) -> TrackerResult<()> {
        self.add_entry(EntryKind::Workout, workout)
    }

    /// Removes a meal by ID; unknown IDs only trigger a re-render.
    pub fn remove_meal(&mut self, id: &EntryId) -> TrackerResult<Option<Entry>> {
        self.remove_entry(EntryKind::Meal, id)
    }

    /// Removes a workout by ID; removing one raises the balance.
    pub fn remove_workout(&mut self, id: &EntryId) -> TrackerResult<Option<Entry>> {
        self.remove_entry(EntryKind::Workout, id)
    }

    /// Appends `entry` to its collection and adjusts the running balance.
    ///
    /// Calories are not validated here.
    pub fn add_entry(&mut self, kind: EntryKind, entry: Entry) -> TrackerResult<()> {
        if self
            .state
            .entries(kind)
            .iter()
            .any(|existing| existing.id() == entry.id())
        {
            warn!(
                "event=entry_add module=tracker status=rejected kind={} error_code=duplicate_id",
                kind
            );
            return Err(TrackerError::DuplicateEntry {
                kind,
                id: entry.id().clone(),
            });
        }

        let total = self.state.total_calories + kind.balance_sign() * entry.calories();
        self.store.save_entry_with_total(kind, &entry, total)?;

        self.state.total_calories = total;
        self.view.append_entry(kind, &entry);
        info!(
            "event=entry_add module=tracker status=ok kind={} calories={} total={}",
            kind,
            entry.calories(),
            total
        );
        self.state.entries_mut(kind).push(entry);

        self.render();
        Ok(())
    }

    /// Removes `id` from storage and, when present, from memory.
    ///
    /// The persisted list is always filtered, even when memory has no such
    /// entry. All in-memory matches are removed; the first one is returned.
    pub fn remove_entry(
        &mut self,
        kind: EntryKind,
        id: &EntryId,
    ) -> TrackerResult<Option<Entry>> {
        let (matches, removed_calories) = self
            .state
            .entries(kind)
            .iter()
            .filter(|entry| entry.id() == id)
            .fold((0_usize, 0.0_f64), |(count, calories), entry| {
                (count + 1, calories + entry.calories())
            });

        if matches == 0 {
            let persisted_removed = self.store.remove_entry(kind, id)?;
            debug!(
                "event=entry_remove module=tracker status=noop kind={} persisted_removed={}",
                kind, persisted_removed
            );
            self.render();
            return Ok(None);
        }

        let total = self.state.total_calories - kind.balance_sign() * removed_calories;
        self.store.remove_entry_with_total(kind, id, total)?;

        self.state.total_calories = total;
        let (removed, kept): (Vec<Entry>, Vec<Entry>) =
            std::mem::take(self.state.entries_mut(kind))
                .into_iter()
                .partition(|entry| entry.id() == id);
        *self.state.entries_mut(kind) = kept;

        self.view.remove_entry(kind, id);
        info!(
            "event=entry_remove module=tracker status=ok kind={} removed={} total={}",
            kind, matches, total
        );

        self.render();
        Ok(removed.into_iter().next())
    }

    /// Clears entries and the running balance; the limit is kept.
    ///
    /// The store is wiped and the current limit written back as one step, so a
    /// failed reset keeps both the entries and the limit.
    pub fn reset_day(&mut self) -> TrackerResult<()> {
        self.store.clear_keeping_limit(self.state.calorie_limit)?;

        self.state.total_calories = 0.0;
        self.state.meals.clear();
        self.state.workouts.clear();

        self.view.clear_entries();
        info!(
            "event=day_reset module=tracker status=ok limit={}",
            self.state.calorie_limit
        );

        self.render();
        Ok(())
    }

    /// Sets the daily limit. Callers validate the value.
    pub fn set_limit(&mut self, limit: f64) -> TrackerResult<()> {
        self.store.set_limit(limit)?;
        self.state.calorie_limit = limit;
        info!("event=limit_set module=tracker status=ok limit={}", limit);

        self.render();
        Ok(())
    }

    /// Recomputes totals from the current entry lists.
    pub fn derived_totals(&self) -> DerivedTotals {
        self.state.derived_totals()
    }

    /// Entries of `kind` whose name contains `query`, ignoring case.
    pub fn filter_entries(&self, kind: EntryKind, query: &str) -> Vec<&Entry> {
        self.state
            .entries(kind)
            .iter()
            .filter(|entry| entry.name_matches(query))
            .collect()
    }

    pub fn state(&self) -> &DayState {
        &self.state
    }

    pub fn meals(&self) -> &[Entry] {
        &self.state.meals
    }

    pub fn workouts(&self) -> &[Entry] {
        &self.state.workouts
    }

    pub fn limit(&self) -> f64 {
        self.state.calorie_limit
    }

    pub fn total_calories(&self) -> f64 {
        self.state.total_calories
    }

    pub fn store(&self) -> &DayStore<K> {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_parts(self) -> (DayStore<K>, V) {
        (self.store, self.view)
    }

    fn render(&mut self) {
        let totals = self.state.derived_totals();
        self.view.render_totals(&totals);
    }
}

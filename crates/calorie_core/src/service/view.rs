//! View sink contract.
//!
//! # Responsibility
//! - Receive plain post-mutation data from the tracker (push model).
//!
//! # Invariants
//! - Renderers never call back into the tracker; they only consume values.

use crate::model::day::DerivedTotals;
use crate::model::entry::{Entry, EntryId, EntryKind};

/// Display sink fed by `DayTracker` after every mutation.
pub trait ViewRenderer {
    /// Full derived snapshot; sent after every operation.
    fn render_totals(&mut self, totals: &DerivedTotals);
    /// One new entry for incremental display.
    fn append_entry(&mut self, kind: EntryKind, entry: &Entry);
    fn remove_entry(&mut self, kind: EntryKind, id: &EntryId);
    /// Drop every rendered entry of both kinds.
    fn clear_entries(&mut self);
}

impl<V: ViewRenderer + ?Sized> ViewRenderer for &mut V {
    fn render_totals(&mut self, totals: &DerivedTotals) {
        (**self).render_totals(totals);
    }

    fn append_entry(&mut self, kind: EntryKind, entry: &Entry) {
        (**self).append_entry(kind, entry);
    }

    fn remove_entry(&mut self, kind: EntryKind, id: &EntryId) {
        (**self).remove_entry(kind, id);
    }

    fn clear_entries(&mut self) {
        (**self).clear_entries();
    }
}

/// Renderer that discards everything; for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl ViewRenderer for NullRenderer {
    fn render_totals(&mut self, _totals: &DerivedTotals) {}

    fn append_entry(&mut self, _kind: EntryKind, _entry: &Entry) {}

    fn remove_entry(&mut self, _kind: EntryKind, _id: &EntryId) {}

    fn clear_entries(&mut self) {}
}

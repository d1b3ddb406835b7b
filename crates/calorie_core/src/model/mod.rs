//! Domain model for the day tracker.
//!
//! # Responsibility
//! - Define entries, the current-day snapshot and derived totals.
//!
//! # Invariants
//! - Meals and workouts share one `Entry` shape but separate ID spaces.

pub mod day;
pub mod entry;

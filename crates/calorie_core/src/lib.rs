//! Core domain logic for the calorie tracker.
//! This crate is the single source of truth for day-state invariants.

pub mod command;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use command::{entry_from_input, limit_from_input, Command, ValidationError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::day::{DayState, DerivedTotals, DEFAULT_CALORIE_LIMIT};
pub use model::entry::{Entry, EntryId, EntryKind};
pub use service::tracker::{DayTracker, TrackerError, TrackerResult};
pub use service::view::{NullRenderer, ViewRenderer};
pub use store::day_store::DayStore;
pub use store::sqlite_kv::SqliteKeyValueStore;
pub use store::{KeyValueStore, MemoryKeyValueStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

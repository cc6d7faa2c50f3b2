//! Core domain logic for Impulse Check.
//! This crate is the single source of truth for goal and counter invariants.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use import::legacy_json::{default_legacy_path, LegacyGoal, LEGACY_STATE_FILE_NAME};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::goal::{Goal, GoalId, GoalValidationError, HISTORY_LIMIT, MAX_COUNT};
pub use repo::goal_store::{GoalStore, SqliteGoalStore, StoreError, StoreResult};
pub use service::counter_engine::CounterEngine;
pub use service::goal_registry::{GoalRegistry, ImportReport, RegistryError, RegistryResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

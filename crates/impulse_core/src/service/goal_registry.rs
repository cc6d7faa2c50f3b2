//! Goal registry use-case service.
//!
//! # Responsibility
//! - Hold the authoritative in-memory view of all goals.
//! - Keep memory and storage consistent for create/delete/increment/undo.
//! - Expose the call surface consumed by the presentation shell.
//!
//! # Invariants
//! - Goal order is creation order.
//! - Names are unique after trimming.
//! - Storage is written before memory changes; a failed write leaves the
//!   registry unchanged.

use crate::import::legacy_json::{parse_legacy_state, LegacyGoal};
use crate::model::goal::{normalize_name, now_epoch_ms, Goal, GoalId, GoalValidationError};
use crate::repo::goal_store::{GoalStore, StoreError};
use crate::service::counter_engine::CounterEngine;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error surfaced to the presentation shell.
#[derive(Debug)]
pub enum RegistryError {
    /// Bad user input; the shell should re-prompt.
    Validation(GoalValidationError),
    /// Operation on an id the registry does not know.
    NotFound(GoalId),
    /// Persisted data is unreadable. Fatal at startup; never auto-repaired.
    CorruptState(String),
    /// Storage transport failure (I/O, locking, SQLite).
    Storage(StoreError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "goal not found: {id}"),
            Self::CorruptState(details) => write!(f, "saved goal state is unreadable: {details}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::CorruptState(_) => None,
        }
    }
}

impl From<GoalValidationError> for RegistryError {
    fn from(value: GoalValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RegistryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Invalid(err) => Self::Validation(err),
            err if err.is_corrupt() => Self::CorruptState(err.to_string()),
            err => Self::Storage(err),
        }
    }
}

/// Summary of a legacy state import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Goals created by the import, in import order.
    pub imported: Vec<GoalId>,
    /// Legacy names skipped because they already exist or are blank.
    pub skipped: Vec<String>,
}

/// In-memory goal collection backed by a `GoalStore`.
pub struct GoalRegistry<S: GoalStore> {
    store: S,
    goals: Vec<Goal>,
}

impl<S: GoalStore> GoalRegistry<S> {
    /// Loads every persisted goal.
    ///
    /// # Errors
    /// - `CorruptState` when persisted data cannot be parsed.
    pub fn open(store: S) -> RegistryResult<Self> {
        let goals = store.load().map_err(|err| {
            error!(
                "event=registry_open module=registry status=error corrupt={} error={}",
                err.is_corrupt(),
                err
            );
            RegistryError::from(err)
        })?;
        info!(
            "event=registry_open module=registry status=ok goals={}",
            goals.len()
        );
        Ok(Self { store, goals })
    }

    /// All goals in creation order.
    pub fn list(&self) -> &[Goal] {
        &self.goals
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Looks up one goal by id.
    pub fn get(&self, id: GoalId) -> RegistryResult<&Goal> {
        self.goals
            .iter()
            .find(|goal| goal.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Looks up one goal by its exact (trimmed) name.
    pub fn find_by_name(&self, name: &str) -> Option<&Goal> {
        let name = name.trim();
        self.goals.iter().find(|goal| goal.name == name)
    }

    /// Creates and persists a new goal.
    ///
    /// # Errors
    /// - `Validation` when the name is blank or already used.
    pub fn create(&mut self, name: &str) -> RegistryResult<&Goal> {
        let name = normalize_name(name)?;
        if self.find_by_name(&name).is_some() {
            return Err(GoalValidationError::DuplicateName(name).into());
        }

        let goal = Goal::new(&name)?;
        self.store.save(&goal)?;
        info!(
            "event=goal_create module=registry status=ok goal_id={}",
            goal.id
        );
        self.goals.push(goal);
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Deletes a goal from storage and memory. Irreversible.
    ///
    /// Returns the removed goal.
    pub fn delete(&mut self, id: GoalId) -> RegistryResult<Goal> {
        let index = self.index_of(id)?;
        self.store.delete(id)?;
        info!("event=goal_delete module=registry status=ok goal_id={id}");
        Ok(self.goals.remove(index))
    }

    /// Increments a goal's counter and persists it.
    pub fn increment(&mut self, id: GoalId) -> RegistryResult<&Goal> {
        let index = self.index_of(id)?;
        CounterEngine::new(&mut self.store).increment(&mut self.goals[index])?;
        Ok(&self.goals[index])
    }

    /// Undoes the last increment of a goal.
    ///
    /// Returns `false` when the counter was already zero (no-op, not an error).
    pub fn undo(&mut self, id: GoalId) -> RegistryResult<bool> {
        let index = self.index_of(id)?;
        let reverted = CounterEngine::new(&mut self.store).undo(&mut self.goals[index])?;
        Ok(reverted)
    }

    /// Imports goals from the legacy JSON state file contents.
    ///
    /// Names that already exist are skipped, so re-running an import is safe.
    /// Every entry is checked before the first write, so a rejected file
    /// imports nothing.
    ///
    /// # Errors
    /// - `CorruptState` when `json` is not a legacy state document.
    /// - `Validation` when a counter is above `MAX_COUNT`.
    pub fn import_legacy_json(&mut self, json: &str) -> RegistryResult<ImportReport> {
        let legacy = parse_legacy_state(json).map_err(|err| {
            error!("event=legacy_import module=registry status=error error={err}");
            RegistryError::CorruptState(err.to_string())
        })?;

        let mut report = ImportReport::default();
        let mut pending: Vec<Goal> = Vec::new();
        for LegacyGoal { name, counter } in legacy {
            let normalized = match normalize_name(&name) {
                Ok(normalized)
                    if self.find_by_name(&normalized).is_none()
                        && pending.iter().all(|goal| goal.name != normalized) =>
                {
                    normalized
                }
                _ => {
                    report.skipped.push(name);
                    continue;
                }
            };

            let mut goal = Goal::with_id(Uuid::new_v4(), &normalized, now_epoch_ms())?;
            goal.count = counter;
            goal.validate().map_err(|err| {
                error!("event=legacy_import module=registry status=error error={err}");
                RegistryError::Validation(err)
            })?;
            pending.push(goal);
        }

        for goal in pending {
            self.store.save(&goal)?;
            report.imported.push(goal.id);
            self.goals.push(goal);
        }

        info!(
            "event=legacy_import module=registry status=ok imported={} skipped={}",
            report.imported.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Consumes the registry, returning the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn index_of(&self, id: GoalId) -> RegistryResult<usize> {
        self.goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or(RegistryError::NotFound(id))
    }
}

//! Goal domain model.
//!
//! # Responsibility
//! - Define the tracked habit/impulse record and its counter state.
//! - Provide the pure increment/undo transitions used by the counter engine.
//!
//! # Invariants
//! - `id` is stable and never reused for another goal.
//! - `name` is trimmed and non-empty.
//! - `history.len() <= min(count, HISTORY_LIMIT)`.
//! - `count` never underflows: undo at zero is a no-op.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a goal.
pub type GoalId = Uuid;

/// Maximum number of increment events retained for undo/display.
///
/// Older events are dropped first. Undo availability is decided by `count`,
/// so counts above this limit stay fully undoable.
pub const HISTORY_LIMIT: usize = 100;

/// Largest count storage can represent (SQLite INTEGER is signed 64-bit).
///
/// Increments saturate here.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// Validation error for goal input and persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    /// Name is empty after trimming whitespace.
    EmptyName,
    /// Another goal already uses this name.
    DuplicateName(String),
    /// More history events than the counter allows.
    HistoryExceedsCount { history_len: usize, count: u64 },
    /// History is longer than `HISTORY_LIMIT`.
    HistoryTooLong(usize),
    /// Count is above `MAX_COUNT`.
    CountOutOfRange(u64),
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "goal name cannot be empty"),
            Self::DuplicateName(name) => write!(f, "goal `{name}` already exists"),
            Self::HistoryExceedsCount { history_len, count } => write!(
                f,
                "goal history has {history_len} events but count is {count}"
            ),
            Self::HistoryTooLong(len) => write!(
                f,
                "goal history has {len} events; limit is {HISTORY_LIMIT}"
            ),
            Self::CountOutOfRange(count) => {
                write!(f, "count {count} is above the supported maximum {MAX_COUNT}")
            }
        }
    }
}

impl Error for GoalValidationError {}

/// One tracked habit or impulse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    pub count: u64,
    /// Epoch milliseconds of recent increments, oldest first.
    pub history: Vec<i64>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds of the last count change.
    pub updated_at: i64,
}

impl Goal {
    /// Creates a fresh goal with a generated stable ID.
    ///
    /// # Errors
    /// - Returns `EmptyName` when `name` is blank after trimming.
    pub fn new(name: &str) -> Result<Self, GoalValidationError> {
        Self::with_id(Uuid::new_v4(), name, now_epoch_ms())
    }

    /// Creates a fresh goal with caller-provided identity and creation time.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: GoalId, name: &str, created_at: i64) -> Result<Self, GoalValidationError> {
        let name = normalize_name(name)?;
        Ok(Self {
            id,
            name,
            count: 0,
            history: Vec::new(),
            created_at,
            updated_at: created_at,
        })
    }

    /// Checks structural invariants of this goal.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if self.count > MAX_COUNT {
            return Err(GoalValidationError::CountOutOfRange(self.count));
        }
        if self.history.len() > HISTORY_LIMIT {
            return Err(GoalValidationError::HistoryTooLong(self.history.len()));
        }
        if self.history.len() as u64 > self.count {
            return Err(GoalValidationError::HistoryExceedsCount {
                history_len: self.history.len(),
                count: self.count,
            });
        }
        Ok(())
    }

    /// Records one increment event at `at_ms`.
    pub fn record_increment(&mut self, at_ms: i64) {
        self.count = self.count.saturating_add(1).min(MAX_COUNT);
        self.history.push(at_ms);
        if self.history.len() > HISTORY_LIMIT {
            let overflow = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..overflow);
        }
        self.updated_at = at_ms;
    }

    /// Reverts the most recent increment.
    ///
    /// Returns `false` and leaves the goal untouched when `count == 0`.
    pub fn revert_increment(&mut self, at_ms: i64) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        self.history.pop();
        self.updated_at = at_ms;
        true
    }

    /// Returns whether an undo would change the counter.
    pub fn can_undo(&self) -> bool {
        self.count > 0
    }

    /// Timestamp of the most recent retained increment, if any.
    pub fn last_increment_at(&self) -> Option<i64> {
        self.history.last().copied()
    }
}

/// Trims and validates a user-supplied goal name.
pub fn normalize_name(name: &str) -> Result<String, GoalValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GoalValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, Goal, GoalValidationError, HISTORY_LIMIT, MAX_COUNT};

    #[test]
    fn new_goal_starts_at_zero_with_trimmed_name() {
        let goal = Goal::new("  smoking \n").unwrap();
        assert_eq!(goal.name, "smoking");
        assert_eq!(goal.count, 0);
        assert!(goal.history.is_empty());
        assert_eq!(goal.created_at, goal.updated_at);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(normalize_name("   "), Err(GoalValidationError::EmptyName));
        assert!(Goal::new("\t").is_err());
    }

    #[test]
    fn revert_at_zero_is_noop() {
        let mut goal = Goal::new("nails").unwrap();
        let before = goal.clone();
        assert!(!goal.revert_increment(42));
        assert_eq!(goal, before);
    }

    #[test]
    fn history_is_bounded_but_count_is_not() {
        let mut goal = Goal::new("coffee").unwrap();
        for at in 0..(HISTORY_LIMIT as i64 + 20) {
            goal.record_increment(at);
        }
        assert_eq!(goal.count, HISTORY_LIMIT as u64 + 20);
        assert_eq!(goal.history.len(), HISTORY_LIMIT);
        assert_eq!(goal.history.first().copied(), Some(20));
        assert_eq!(goal.last_increment_at(), Some(HISTORY_LIMIT as i64 + 19));
        goal.validate().unwrap();
    }

    #[test]
    fn undo_past_retained_history_still_decrements() {
        let mut goal = Goal::new("coffee").unwrap();
        for at in 0..(HISTORY_LIMIT as i64 + 3) {
            goal.record_increment(at);
        }
        for _ in 0..(HISTORY_LIMIT + 3) {
            assert!(goal.revert_increment(0));
        }
        assert_eq!(goal.count, 0);
        assert!(goal.history.is_empty());
        assert!(!goal.can_undo());
    }

    #[test]
    fn validate_rejects_history_longer_than_count() {
        let mut goal = Goal::new("snacks").unwrap();
        goal.history = vec![1, 2];
        goal.count = 1;
        assert!(matches!(
            goal.validate(),
            Err(GoalValidationError::HistoryExceedsCount { history_len: 2, count: 1 })
        ));
    }

    #[test]
    fn increment_saturates_at_max_count() {
        let mut goal = Goal::new("coffee").unwrap();
        goal.count = MAX_COUNT - 1;
        goal.record_increment(1);
        goal.record_increment(2);
        assert_eq!(goal.count, MAX_COUNT);
        goal.validate().unwrap();

        goal.count = MAX_COUNT + 1;
        assert_eq!(
            goal.validate(),
            Err(GoalValidationError::CountOutOfRange(MAX_COUNT + 1))
        );
    }
}

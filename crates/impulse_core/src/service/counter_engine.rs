//! Counter engine for a single goal.
//!
//! # Responsibility
//! - Apply increment/undo transitions and persist them before returning.
//!
//! # Invariants
//! - The in-memory goal is only replaced after the store accepted the write,
//!   so a failed save leaves the caller's goal unchanged.
//! - Undo at `count == 0` neither errors nor writes.

use crate::model::goal::{now_epoch_ms, Goal};
use crate::repo::goal_store::{GoalStore, StoreResult};
use log::debug;

/// Increment/undo contract over one goal at a time.
pub struct CounterEngine<'s, S: GoalStore> {
    store: &'s mut S,
}

impl<'s, S: GoalStore> CounterEngine<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Records one event and persists the goal.
    ///
    /// Returns the new count.
    pub fn increment(&mut self, goal: &mut Goal) -> StoreResult<u64> {
        let mut next = goal.clone();
        next.record_increment(now_epoch_ms());
        self.store.save(&next)?;
        *goal = next;

        debug!(
            "event=goal_increment module=engine status=ok goal_id={} count={}",
            goal.id, goal.count
        );
        Ok(goal.count)
    }

    /// Reverts the most recent increment.
    ///
    /// Returns `false` without touching storage when there is nothing to undo.
    pub fn undo(&mut self, goal: &mut Goal) -> StoreResult<bool> {
        let mut next = goal.clone();
        if !next.revert_increment(now_epoch_ms()) {
            debug!(
                "event=goal_undo module=engine status=noop goal_id={}",
                goal.id
            );
            return Ok(false);
        }
        self.store.save(&next)?;
        *goal = next;

        debug!(
            "event=goal_undo module=engine status=ok goal_id={} count={}",
            goal.id, goal.count
        );
        Ok(true)
    }

    /// Current tally. Pure read.
    pub fn current(goal: &Goal) -> u64 {
        goal.count
    }
}

#[cfg(test)]
mod tests {
    use super::CounterEngine;
    use crate::db::DbError;
    use crate::model::goal::{Goal, GoalId};
    use crate::repo::goal_store::{GoalStore, StoreError, StoreResult};
    use std::io::{Error as IoError, ErrorKind};

    #[derive(Default)]
    struct RecordingStore {
        saves: Vec<Goal>,
        fail_saves: bool,
    }

    impl GoalStore for RecordingStore {
        fn load(&self) -> StoreResult<Vec<Goal>> {
            Ok(Vec::new())
        }

        fn save(&mut self, goal: &Goal) -> StoreResult<()> {
            if self.fail_saves {
                return Err(StoreError::Db(DbError::Io(IoError::new(
                    ErrorKind::Other,
                    "disk full",
                ))));
            }
            self.saves.push(goal.clone());
            Ok(())
        }

        fn delete(&mut self, _id: GoalId) -> StoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn increment_then_undo_persists_each_step() {
        let mut store = RecordingStore::default();
        let mut goal = Goal::new("smoking").unwrap();
        let mut engine = CounterEngine::new(&mut store);

        for _ in 0..3 {
            engine.increment(&mut goal).unwrap();
        }
        assert!(engine.undo(&mut goal).unwrap());
        assert_eq!(CounterEngine::<RecordingStore>::current(&goal), 2);

        assert_eq!(store.saves.len(), 4);
        assert_eq!(store.saves.last().map(|g| g.count), Some(2));
    }

    #[test]
    fn undo_at_zero_does_not_write() {
        let mut store = RecordingStore::default();
        let mut goal = Goal::new("nails").unwrap();
        let mut engine = CounterEngine::new(&mut store);

        assert!(!engine.undo(&mut goal).unwrap());
        assert!(!engine.undo(&mut goal).unwrap());
        assert_eq!(goal.count, 0);
        assert!(store.saves.is_empty());
    }

    #[test]
    fn failed_save_leaves_goal_unchanged() {
        let mut store = RecordingStore {
            fail_saves: true,
            ..RecordingStore::default()
        };
        let mut goal = Goal::new("snacks").unwrap();
        let before = goal.clone();

        let err = CounterEngine::new(&mut store)
            .increment(&mut goal)
            .unwrap_err();
        assert!(!err.is_corrupt());
        assert_eq!(goal, before);
    }

    #[test]
    fn mixed_sequence_never_goes_negative() {
        let mut store = RecordingStore::default();
        let mut goal = Goal::new("A").unwrap();
        let mut engine = CounterEngine::new(&mut store);
        let mut expected: u64 = 0;

        // true = increment, false = undo
        let ops = [
            true, false, false, true, true, false, true, false, false, false, true,
        ];
        for op in ops {
            if op {
                engine.increment(&mut goal).unwrap();
                expected += 1;
            } else {
                engine.undo(&mut goal).unwrap();
                expected = expected.saturating_sub(1);
            }
            assert_eq!(goal.count, expected);
        }
    }
}

//! Goal storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist one record per goal, addressable by `GoalId`.
//! - Load every goal in creation order at process start.
//!
//! # Invariants
//! - `save` replaces the goal row and its event rows in one transaction.
//! - `delete` of an absent id is a no-op.
//! - `save` refuses goals that break model invariants before touching the
//!   database; such refusals are not corruption.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::goal::{Goal, GoalId, GoalValidationError};
use log::{debug, error};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error for goal persistence.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Goal handed to `save` cannot be represented in storage.
    Invalid(GoalValidationError),
    /// Persisted data exists but cannot be turned back into goals.
    Corrupt(String),
}

impl StoreError {
    /// Returns whether the persisted state is unreadable.
    pub fn is_corrupt(&self) -> bool {
        match self {
            Self::Corrupt(_) => true,
            Self::Invalid(_) => false,
            Self::Db(err) => err.is_corrupt(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Invalid(err) => write!(f, "cannot store goal: {err}"),
            Self::Corrupt(message) => write!(f, "invalid persisted goal data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Invalid(err) => Some(err),
            Self::Corrupt(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable goal persistence.
pub trait GoalStore {
    /// Reads all persisted goals in creation order.
    fn load(&self) -> StoreResult<Vec<Goal>>;
    /// Writes or overwrites one goal record.
    fn save(&mut self, goal: &Goal) -> StoreResult<()>;
    /// Removes one goal record; absent ids are ignored.
    fn delete(&mut self, id: GoalId) -> StoreResult<()>;
}

/// SQLite-backed goal store.
pub struct SqliteGoalStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteGoalStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `Corrupt` when the connection's schema does not match this binary.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        let version = schema_version(conn)?;
        if version != latest_version() {
            return Err(StoreError::Corrupt(format!(
                "schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }
}

impl GoalStore for SqliteGoalStore<'_> {
    fn load(&self) -> StoreResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, count, created_at, updated_at
             FROM goals
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }

        let mut events = self.conn.prepare(
            "SELECT occurred_at FROM goal_events WHERE goal_id = ?1 ORDER BY seq ASC;",
        )?;
        for goal in &mut goals {
            let history = events
                .query_map([goal.id.to_string()], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            goal.history = history;
            goal.validate()
                .map_err(|err| StoreError::Corrupt(format!("goal {}: {err}", goal.id)))?;
        }

        debug!("event=store_load module=store status=ok goals={}", goals.len());
        Ok(goals)
    }

    fn save(&mut self, goal: &Goal) -> StoreResult<()> {
        goal.validate().map_err(StoreError::Invalid)?;
        let count = i64::try_from(goal.count)
            .map_err(|_| StoreError::Invalid(GoalValidationError::CountOutOfRange(goal.count)))?;
        let id_text = goal.id.to_string();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO goals (id, name, count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                count = excluded.count,
                updated_at = excluded.updated_at;",
            params![
                id_text.as_str(),
                goal.name.as_str(),
                count,
                goal.created_at,
                goal.updated_at
            ],
        )?;
        tx.execute(
            "DELETE FROM goal_events WHERE goal_id = ?1;",
            [id_text.as_str()],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO goal_events (goal_id, seq, occurred_at) VALUES (?1, ?2, ?3);",
            )?;
            for (seq, occurred_at) in goal.history.iter().enumerate() {
                insert.execute(params![id_text.as_str(), seq as i64, occurred_at])?;
            }
        }
        if let Err(err) = tx.commit() {
            error!(
                "event=store_save module=store status=error goal_id={} error={}",
                goal.id, err
            );
            return Err(err.into());
        }

        debug!(
            "event=store_save module=store status=ok goal_id={} count={}",
            goal.id, goal.count
        );
        Ok(())
    }

    fn delete(&mut self, id: GoalId) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id.to_string()])?;
        debug!("event=store_delete module=store status=ok goal_id={id} removed={removed}");
        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> StoreResult<Goal> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::Corrupt(format!("invalid uuid value `{id_text}` in goals.id")))?;

    let raw_count: i64 = row.get("count")?;
    let count = u64::try_from(raw_count).map_err(|_| {
        StoreError::Corrupt(format!("negative count `{raw_count}` for goal {id}"))
    })?;

    Ok(Goal {
        id,
        name: row.get("name")?,
        count,
        history: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

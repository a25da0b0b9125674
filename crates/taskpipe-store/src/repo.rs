//! SQLite-backed task repository.
//!
//! Every operation runs inside its own `BEGIN IMMEDIATE` transaction, so a
//! mutation's before/after snapshots are captured under the write lock and
//! concurrent writers to the same task serialize at the storage layer —
//! the repository holds no locks of its own beyond a connection mutex.
//!
//! Timestamps are truncated to microsecond precision before writing so a
//! stored task compares equal to the value returned from the mutation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params, types::Type};

use taskpipe_core::error::Error;
use taskpipe_core::model::{Task, TaskDraft, TaskFilter, TaskId, TaskPatch, UserId};
use taskpipe_core::ports::{Change, TaskRepository};

use crate::db;

/// Transactional CRUD over the todos table, scoped by owner.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the repository database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or migrating the database fails.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = db::open_task_db(path, busy_timeout)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory repository for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if migrating the database fails.
    pub fn in_memory() -> Result<Self> {
        let conn = db::open_task_db_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoned mutex means another thread panicked mid-operation; the
        // connection itself is still usable and the aborted transaction was
        // rolled back on drop.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction; commit on `Ok`,
    /// roll back on `Err` (via drop).
    fn with_tx<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(storage)?;
        let value = f(&tx)?;
        tx.commit().map_err(storage)?;
        Ok(value)
    }
}

impl TaskRepository for SqliteRepository {
    fn add(&self, owner_id: UserId, draft: &TaskDraft) -> Result<Task, Error> {
        draft.validate()?;

        let now = truncate_to_micros(Utc::now());
        let task = Task {
            id: TaskId::generate(),
            owner_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            completed: false,
            created_at: now,
            updated_at: now,
        };

        self.with_tx(|conn| {
            conn.execute(
                "INSERT INTO todos (id, owner_id, title, description, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task.id.to_string(),
                    task.owner_id.to_string(),
                    task.title,
                    task.description,
                    i64::from(task.completed),
                    format_ts(task.created_at),
                    format_ts(task.updated_at),
                ],
            )
            .map_err(storage)?;
            Ok(())
        })?;

        Ok(task)
    }

    fn list(&self, owner_id: UserId, filter: TaskFilter) -> Result<Vec<Task>, Error> {
        let conn = self.lock();
        let (sql, completed): (&str, Option<i64>) = match filter {
            TaskFilter::All => (
                "SELECT id, owner_id, title, description, completed, created_at, updated_at
                 FROM todos WHERE owner_id = ?1
                 ORDER BY created_at, id",
                None,
            ),
            TaskFilter::Completed => (
                "SELECT id, owner_id, title, description, completed, created_at, updated_at
                 FROM todos WHERE owner_id = ?1 AND completed = ?2
                 ORDER BY created_at, id",
                Some(1),
            ),
            TaskFilter::Pending => (
                "SELECT id, owner_id, title, description, completed, created_at, updated_at
                 FROM todos WHERE owner_id = ?1 AND completed = ?2
                 ORDER BY created_at, id",
                Some(0),
            ),
        };

        let mut stmt = conn.prepare(sql).map_err(storage)?;
        let rows = match completed {
            None => stmt.query_map(params![owner_id.to_string()], map_task_row),
            Some(flag) => stmt.query_map(params![owner_id.to_string(), flag], map_task_row),
        }
        .map_err(storage)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.map_err(storage)?);
        }
        Ok(tasks)
    }

    fn get(&self, owner_id: UserId, task_id: TaskId) -> Result<Task, Error> {
        let conn = self.lock();
        fetch_in(&conn, owner_id, task_id)
    }

    fn update(
        &self,
        owner_id: UserId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Change, Error> {
        patch.validate()?;

        self.with_tx(|conn| {
            let before = fetch_in(conn, owner_id, task_id)?;

            let mut after = before.clone();
            if let Some(title) = &patch.title {
                after.title = title.clone();
            }
            if let Some(description) = &patch.description {
                after.description = Some(description.clone());
            }
            // Refresh unconditionally, content no-op or not.
            after.updated_at = truncate_to_micros(Utc::now());

            conn.execute(
                "UPDATE todos SET title = ?1, description = ?2, updated_at = ?3
                 WHERE id = ?4 AND owner_id = ?5",
                params![
                    after.title,
                    after.description,
                    format_ts(after.updated_at),
                    task_id.to_string(),
                    owner_id.to_string(),
                ],
            )
            .map_err(storage)?;

            Ok(Change { before, after })
        })
    }

    fn delete(&self, owner_id: UserId, task_id: TaskId) -> Result<Task, Error> {
        self.with_tx(|conn| {
            let last_known = fetch_in(conn, owner_id, task_id)?;
            conn.execute(
                "DELETE FROM todos WHERE id = ?1 AND owner_id = ?2",
                params![task_id.to_string(), owner_id.to_string()],
            )
            .map_err(storage)?;
            Ok(last_known)
        })
    }

    fn set_completed(
        &self,
        owner_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Change, Error> {
        self.with_tx(|conn| {
            let before = fetch_in(conn, owner_id, task_id)?;

            let mut after = before.clone();
            after.completed = completed;
            after.updated_at = truncate_to_micros(Utc::now());

            conn.execute(
                "UPDATE todos SET completed = ?1, updated_at = ?2
                 WHERE id = ?3 AND owner_id = ?4",
                params![
                    i64::from(after.completed),
                    format_ts(after.updated_at),
                    task_id.to_string(),
                    owner_id.to_string(),
                ],
            )
            .map_err(storage)?;

            Ok(Change { before, after })
        })
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn fetch_in(conn: &Connection, owner_id: UserId, task_id: TaskId) -> Result<Task, Error> {
    conn.query_row(
        "SELECT id, owner_id, title, description, completed, created_at, updated_at
         FROM todos WHERE id = ?1 AND owner_id = ?2",
        params![task_id.to_string(), owner_id.to_string()],
        map_task_row,
    )
    .optional()
    .map_err(storage)?
    .ok_or(Error::NotFound)
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let owner_id: String = row.get(1)?;
    let completed: i64 = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Task {
        id: parse_column(0, &id)?,
        owner_id: parse_column(1, &owner_id)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: completed != 0,
        created_at: parse_ts_column(5, &created_at)?,
        updated_at: parse_ts_column(6, &updated_at)?,
    })
}

fn parse_column<T>(index: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|error: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

fn parse_ts_column(index: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
        })
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Drop sub-microsecond precision so the in-memory value equals what a
/// later read parses back from the RFC 3339 column.
fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000).unwrap_or(ts)
}

fn storage(error: rusqlite::Error) -> Error {
    Error::Storage(error.into())
}

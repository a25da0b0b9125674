//! SQLite key-value projection sink.
//!
//! Mirrors the current record of each task under the key `todo-{id}`, as
//! JSON. Deliberately not authoritative: the pipeline writes here
//! best-effort after the primary store commits, so entries can be stale or
//! absent after an outage, and nothing in the core repairs them — a
//! consumer needing certainty re-derives from the primary store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use taskpipe_core::error::DownstreamError;
use taskpipe_core::event::TaskRecord;
use taskpipe_core::model::{Task, TaskId};
use taskpipe_core::ports::{StateProjector, state_key};

const KV_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key           TEXT PRIMARY KEY,
    value         TEXT NOT NULL,
    updated_at_us INTEGER NOT NULL
);
";

/// Key-value projection sink backed by its own SQLite database.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    /// Open (or create) the sink database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or initializing the database fails.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create state store directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open state store {}", path.display()))?;
        Self::init(conn, busy_timeout)
    }

    /// In-memory sink for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if initializing the database fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory state store")?;
        Self::init(conn, DEFAULT_SINK_BUSY_TIMEOUT)
    }

    fn init(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)
            .context("set state store busy timeout")?;
        conn.execute_batch(KV_SCHEMA)
            .context("create state store schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the raw JSON value stored under a task's key, if any.
    ///
    /// # Errors
    ///
    /// Returns an error on sink faults.
    pub fn fetch(&self, task_id: TaskId) -> Result<Option<String>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![state_key(task_id)],
            |row| row.get(0),
        )
        .optional()
        .context("read state store entry")
    }

    /// Number of entries currently in the sink.
    ///
    /// # Errors
    ///
    /// Returns an error on sink faults.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .context("count state store entries")?;
        usize::try_from(count).context("entry count out of range")
    }

    /// True when the sink has no entries.
    ///
    /// # Errors
    ///
    /// Returns an error on sink faults.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Sink-side busy timeout; bounded so a contended sink degrades into a
/// dropped projection write instead of stalled latency.
const DEFAULT_SINK_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

impl StateProjector for SqliteStateStore {
    fn upsert(&self, task: &Task) -> Result<(), DownstreamError> {
        let value = serde_json::to_string(&TaskRecord::from(task))
            .map_err(|e| DownstreamError::Project(e.into()))?;

        let conn = self.lock();
        conn.execute(
            "INSERT INTO kv (key, value, updated_at_us) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at_us = excluded.updated_at_us",
            params![
                state_key(task.id),
                value,
                task.updated_at.timestamp_micros(),
            ],
        )
        .map(|_| ())
        .map_err(|e| DownstreamError::Project(e.into()))
    }

    fn remove(&self, task_id: TaskId) -> Result<(), DownstreamError> {
        let conn = self.lock();
        conn.execute(
            "DELETE FROM kv WHERE key = ?1",
            params![state_key(task_id)],
        )
        .map(|_| ())
        .map_err(|e| DownstreamError::Project(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskpipe_core::model::UserId;

    fn task(title: &str) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::generate(),
            owner_id: UserId::generate(),
            title: title.into(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn upsert_then_fetch_returns_the_record_json() {
        let sink = SqliteStateStore::in_memory().expect("open sink");
        let t = task("mirror me");
        sink.upsert(&t).expect("upsert");

        let raw = sink.fetch(t.id).expect("fetch").expect("entry present");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["id"], t.id.to_string());
        assert_eq!(value["user_id"], t.owner_id.to_string());
        assert_eq!(value["title"], "mirror me");
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let sink = SqliteStateStore::in_memory().expect("open sink");
        let mut t = task("v1");
        sink.upsert(&t).expect("upsert");
        t.title = "v2".into();
        sink.upsert(&t).expect("upsert again");

        assert_eq!(sink.len().expect("len"), 1);
        let raw = sink.fetch(t.id).expect("fetch").expect("entry");
        assert!(raw.contains("v2"));
    }

    #[test]
    fn remove_clears_the_entry_and_is_idempotent() {
        let sink = SqliteStateStore::in_memory().expect("open sink");
        let t = task("gone soon");
        sink.upsert(&t).expect("upsert");

        sink.remove(t.id).expect("remove");
        assert_eq!(sink.fetch(t.id).expect("fetch"), None);
        sink.remove(t.id).expect("remove again");
        assert!(sink.is_empty().expect("is_empty"));
    }
}

//! SQL schema for the primary task database.
//!
//! Timestamps are stored as RFC 3339 text (microsecond precision, UTC);
//! ids as hyphenated lowercase UUID text; `completed` as 0/1.

/// Schema v1: the todos table and the owner index every query hits.
pub const MIGRATION_V1_SQL: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id          TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    title       TEXT NOT NULL CHECK (length(title) > 0),
    description TEXT,
    completed   INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_todos_owner ON todos(owner_id, created_at);
";

/// Schema v2: composite index for the completed/pending list filters.
pub const MIGRATION_V2_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_todos_owner_completed
    ON todos(owner_id, completed, created_at);
";

/// Indexes that must exist after migration, checked by tests.
pub const REQUIRED_INDEXES: &[&str] = &["idx_todos_owner", "idx_todos_owner_completed"];

//! taskpipe-store library.
//!
//! Concrete backends for the three `taskpipe-core` ports:
//!
//! - [`repo::SqliteRepository`] — transactional primary store (SQLite, WAL)
//! - [`bus::JsonlEventBus`] — append-only per-topic event log
//! - [`kv::SqliteStateStore`] — key-value projection sink
//!
//! The repository is strict: its errors surface to callers. The bus and
//! the sink are best-effort: their errors come back as `DownstreamError`
//! values for the pipeline to log and drop.

pub mod bus;
pub mod db;
pub mod kv;
pub mod migrations;
pub mod repo;
pub mod schema;

pub use bus::JsonlEventBus;
pub use kv::SqliteStateStore;
pub use repo::SqliteRepository;

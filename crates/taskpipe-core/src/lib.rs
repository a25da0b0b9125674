//! taskpipe-core library.
//!
//! Domain model and mutation pipeline for the taskpipe todo service:
//!
//! - [`model`] — task records, ids, validation
//! - [`guard`] — the ownership check every request passes through
//! - [`event`] — envelope model and builder for the `todo.*` event catalog
//! - [`ports`] — repository / publisher / projector seams
//! - [`pipeline`] — sequences guard → mutation → publish → project
//! - [`api`] — wire-contract DTOs for an external routing layer
//!
//! # Conventions
//!
//! - **Errors**: typed [`error::Error`] for caller-visible failures,
//!   `anyhow::Result` with context for infrastructure plumbing.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod guard;
pub mod model;
pub mod pipeline;
pub mod ports;

pub use error::{DownstreamError, Error};
pub use event::{Envelope, EventData, EventType};
pub use model::{Task, TaskDraft, TaskFilter, TaskId, TaskPatch, UserId};
pub use pipeline::{Mutated, Pipeline, SideEffects};
pub use ports::{Change, EventPublisher, StateProjector, TaskRepository};

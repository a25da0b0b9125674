//! Seams between the pipeline and its collaborators.
//!
//! The pipeline is generic over three traits: the transactional
//! [`TaskRepository`] (primary store), the best-effort [`EventPublisher`]
//! (external bus), and the best-effort [`StateProjector`] (external KV
//! sink). Concrete implementations live in `taskpipe-store`; tests use
//! in-memory doubles.

use crate::error::{DownstreamError, Error};
use crate::event::Envelope;
use crate::model::{Task, TaskDraft, TaskFilter, TaskId, TaskPatch, UserId};

/// Before/after snapshots of one mutation, captured inside the same
/// transaction so the pair can never show torn state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub before: Task,
    pub after: Task,
}

/// Transactional CRUD over task records, scoped by owner.
///
/// Every operation is atomic: its effect becomes visible to subsequent
/// reads only on success. Cross-owner lookups yield [`Error::NotFound`],
/// never a hint that the task exists under a different owner.
pub trait TaskRepository {
    /// Create a task with `completed = false`, a fresh id, and
    /// `created_at == updated_at`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for an empty/overlong title or overlong
    /// description; [`Error::Storage`] on store faults.
    fn add(&self, owner_id: UserId, draft: &TaskDraft) -> Result<Task, Error>;

    /// All tasks for `owner_id` matching `filter`, in creation order.
    ///
    /// # Errors
    ///
    /// [`Error::Storage`] on store faults.
    fn list(&self, owner_id: UserId, filter: TaskFilter) -> Result<Vec<Task>, Error>;

    /// A single task under `owner_id`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no such task exists under that owner.
    fn get(&self, owner_id: UserId, task_id: TaskId) -> Result<Task, Error>;

    /// Partial update; unset patch fields retain their prior value.
    /// `updated_at` refreshes unconditionally, content no-op or not.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`], [`Error::Validation`], or [`Error::Storage`].
    fn update(&self, owner_id: UserId, task_id: TaskId, patch: &TaskPatch)
    -> Result<Change, Error>;

    /// Hard delete; returns the last-known record for the deletion event.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent; [`Error::Storage`] on store faults.
    fn delete(&self, owner_id: UserId, task_id: TaskId) -> Result<Task, Error>;

    /// Set the completion flag explicitly. Toggle semantics (no explicit
    /// value) belong to the pipeline, not here.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if absent; [`Error::Storage`] on store faults.
    fn set_completed(
        &self,
        owner_id: UserId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Change, Error>;
}

/// Best-effort, at-least-once delivery of envelopes to an external bus.
///
/// One attempt per call; no retry in the core. A failure is an ordinary
/// return value — the pipeline logs it and moves on, never rolling back
/// the committed mutation.
pub trait EventPublisher {
    /// Attempt delivery of one envelope.
    ///
    /// # Errors
    ///
    /// [`DownstreamError::Publish`] on any delivery failure.
    fn publish(&self, envelope: &Envelope) -> Result<(), DownstreamError>;
}

/// Best-effort mirror of current task state into an external KV sink.
///
/// The projection is allowed to diverge from the primary store; nothing in
/// the core reconciles it.
pub trait StateProjector {
    /// Write the current record under the task's key.
    ///
    /// # Errors
    ///
    /// [`DownstreamError::Project`] on sink failure.
    fn upsert(&self, task: &Task) -> Result<(), DownstreamError>;

    /// Remove the task's key (after deletion).
    ///
    /// # Errors
    ///
    /// [`DownstreamError::Project`] on sink failure.
    fn remove(&self, task_id: TaskId) -> Result<(), DownstreamError>;
}

/// Projection sink key for a task: `todo-{id}`.
#[must_use]
pub fn state_key(task_id: TaskId) -> String {
    format!("todo-{task_id}")
}

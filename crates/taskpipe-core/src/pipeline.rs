//! The mutation pipeline.
//!
//! Sequences one request through
//! `guard → repository → envelope → publish → project`:
//!
//! - Guard and repository failures abort immediately and are the only
//!   errors the caller ever sees.
//! - Publish and projection failures are recorded in [`SideEffects`] and
//!   logged at `warn`, but never branch control flow and never surface.
//!
//! That asymmetry is the central contract: correctness of the task's own
//! state is strict; propagation to observers is advisory. Once the
//! repository commits, the caller gets the mutation result no matter what
//! the bus or the sink do.
//!
//! A `Pipeline` owns explicit handles to its three collaborators — there is
//! no process-wide registry. Construct one per request path (or share one;
//! it has no interior mutability of its own).

use crate::error::Error;
use crate::event::Envelope;
use crate::guard;
use crate::model::{Task, TaskDraft, TaskFilter, TaskId, TaskPatch, UserId};
use crate::ports::{EventPublisher, StateProjector, TaskRepository};

/// Outcome summary of the two advisory steps. Observable via logs and this
/// struct only; never part of the caller-visible error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffects {
    /// The envelope reached the bus.
    pub published: bool,
    /// The projection sink accepted the mirror write (or removal).
    pub projected: bool,
}

impl SideEffects {
    /// Both advisory steps succeeded.
    #[must_use]
    pub const fn clean(self) -> bool {
        self.published && self.projected
    }
}

/// A committed mutation result plus its side-effect summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutated<T> {
    pub value: T,
    pub effects: SideEffects,
}

/// What the projector should do after a given mutation.
enum Mirror<'a> {
    Upsert(&'a Task),
    Remove(TaskId),
}

/// Sequences authorization, mutation, and side-effect propagation for each
/// request.
#[derive(Debug, Clone)]
pub struct Pipeline<R, P, S> {
    repo: R,
    publisher: P,
    projector: S,
}

impl<R, P, S> Pipeline<R, P, S>
where
    R: TaskRepository,
    P: EventPublisher,
    S: StateProjector,
{
    /// Assemble a pipeline from its three collaborators.
    pub const fn new(repo: R, publisher: P, projector: S) -> Self {
        Self {
            repo,
            publisher,
            projector,
        }
    }

    /// List the owner's tasks. Guarded read; no event, no projection.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] if `actor != owner`; [`Error::Storage`] on
    /// store faults.
    pub fn list(
        &self,
        actor: UserId,
        owner: UserId,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, Error> {
        guard::authorize(actor, owner)?;
        self.repo.list(owner, filter)
    }

    /// Fetch a single task. Guarded read.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] or [`Error::NotFound`].
    pub fn get(&self, actor: UserId, owner: UserId, task_id: TaskId) -> Result<Task, Error> {
        guard::authorize(actor, owner)?;
        self.repo.get(owner, task_id)
    }

    /// Create a task, then emit `todo.created` and mirror the new record.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] or [`Error::Validation`].
    pub fn create(
        &self,
        actor: UserId,
        owner: UserId,
        draft: &TaskDraft,
    ) -> Result<Mutated<Task>, Error> {
        guard::authorize(actor, owner)?;
        let task = self.repo.add(owner, draft)?;

        let envelope = Envelope::created(&task);
        let effects = self.settle(&envelope, &Mirror::Upsert(&task));
        Ok(Mutated {
            value: task,
            effects,
        })
    }

    /// Update title/description, then emit `todo.updated` and mirror the
    /// post-mutation record.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`], [`Error::NotFound`], or [`Error::Validation`].
    pub fn update(
        &self,
        actor: UserId,
        owner: UserId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> Result<Mutated<Task>, Error> {
        guard::authorize(actor, owner)?;
        let change = self.repo.update(owner, task_id, patch)?;

        let envelope = Envelope::updated(&change.before, &change.after);
        let effects = self.settle(&envelope, &Mirror::Upsert(&change.after));
        Ok(Mutated {
            value: change.after,
            effects,
        })
    }

    /// Delete a task, then emit `todo.deleted` (with the last-known record)
    /// and remove the projection entry.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] or [`Error::NotFound`].
    pub fn delete(
        &self,
        actor: UserId,
        owner: UserId,
        task_id: TaskId,
    ) -> Result<Mutated<Task>, Error> {
        guard::authorize(actor, owner)?;
        let last_known = self.repo.delete(owner, task_id)?;

        let envelope = Envelope::deleted(&last_known);
        let effects = self.settle(&envelope, &Mirror::Remove(task_id));
        Ok(Mutated {
            value: last_known,
            effects,
        })
    }

    /// Set or toggle the completion flag, then emit `todo.completed` /
    /// `todo.uncompleted` and mirror the record.
    ///
    /// `completed = None` flips the current value (absence and explicit
    /// null are identical on the wire — both deserialize to `None`). The
    /// current value is read under the guard, then set explicitly; toggle
    /// semantics live here, not in the repository.
    ///
    /// The read and the write run in separate transactions: two concurrent
    /// no-value toggles can observe the same starting flag and collapse
    /// into one flip. Each write is still atomic and its envelope carries
    /// the before/after pair that transaction actually saw.
    ///
    /// # Errors
    ///
    /// [`Error::Forbidden`] or [`Error::NotFound`].
    pub fn set_completed(
        &self,
        actor: UserId,
        owner: UserId,
        task_id: TaskId,
        completed: Option<bool>,
    ) -> Result<Mutated<Task>, Error> {
        guard::authorize(actor, owner)?;

        let desired = match completed {
            Some(value) => value,
            None => !self.repo.get(owner, task_id)?.completed,
        };
        let change = self.repo.set_completed(owner, task_id, desired)?;

        let envelope = Envelope::completion(&change.before, &change.after);
        let effects = self.settle(&envelope, &Mirror::Upsert(&change.after));
        Ok(Mutated {
            value: change.after,
            effects,
        })
    }

    /// Run the two advisory steps for a committed mutation. Failures are
    /// logged and folded into the summary; they never propagate.
    fn settle(&self, envelope: &Envelope, mirror: &Mirror<'_>) -> SideEffects {
        let published = match self.publisher.publish(envelope) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    step = %error.step(),
                    event_type = %envelope.event_type,
                    task_id = %envelope.data.task_id(),
                    user_id = %envelope.data.user_id(),
                    error = %error,
                    "event publish failed; mutation already committed, continuing"
                );
                false
            }
        };

        let projection = match mirror {
            Mirror::Upsert(task) => self.projector.upsert(task),
            Mirror::Remove(task_id) => self.projector.remove(*task_id),
        };
        let projected = match projection {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    step = %error.step(),
                    event_type = %envelope.event_type,
                    task_id = %envelope.data.task_id(),
                    user_id = %envelope.data.user_id(),
                    error = %error,
                    "state projection failed; mutation already committed, continuing"
                );
                false
            }
        };

        SideEffects {
            published,
            projected,
        }
    }
}

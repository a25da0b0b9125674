//! Domain model: task records, identifiers, and mutation inputs.

pub mod ids;
pub mod task;

pub use ids::{ParseIdError, TaskId, UserId};
pub use task::{
    MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, Task, TaskDraft, TaskFilter, TaskPatch, UnknownFilter,
};

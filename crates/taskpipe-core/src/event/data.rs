//! Typed payload data for each event type.
//!
//! Every payload carries the full task record (flattened, so `id` and
//! `user_id` are always present at the top level of `data`), plus the
//! pre-mutation values the event type calls for:
//!
//! - `todo.created` / `todo.deleted` — the record alone (post-mutation for
//!   created, last-known for deleted).
//! - `todo.updated` — record plus `original_title` / `original_description`.
//! - `todo.completed` / `todo.uncompleted` — record plus
//!   `original_completed`.

use crate::model::{Task, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::EventType;

/// Flattened snapshot of one task, as it appears inside event payloads and
/// projection records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            user_id: task.owner_id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Payload for `todo.created`: the post-mutation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedData {
    #[serde(flatten)]
    pub task: TaskRecord,
}

/// Payload for `todo.updated`: the post-mutation record plus the
/// pre-mutation title and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedData {
    #[serde(flatten)]
    pub task: TaskRecord,
    pub original_title: String,
    pub original_description: Option<String>,
}

/// Payload for `todo.deleted`: the last-known full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedData {
    #[serde(flatten)]
    pub task: TaskRecord,
}

/// Payload for `todo.completed` and `todo.uncompleted`: the post-mutation
/// record plus the pre-mutation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionData {
    #[serde(flatten)]
    pub task: TaskRecord,
    pub original_completed: bool,
}

/// Typed payload for an envelope. The discriminant comes from
/// [`EventType`], not from the JSON itself (it is an external tag on the
/// envelope).
///
/// **Serde note:** `EventData` implements `Serialize` by dispatching to the
/// inner struct but does **not** implement `Deserialize` directly. Use
/// [`EventData::deserialize_for`] with the known [`EventType`]; the
/// [`Envelope`](super::Envelope) struct does this in its custom
/// `Deserialize` impl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventData {
    /// Payload for `todo.created`.
    Created(CreatedData),
    /// Payload for `todo.updated`.
    Updated(UpdatedData),
    /// Payload for `todo.deleted`.
    Deleted(DeletedData),
    /// Payload for `todo.completed`.
    Completed(CompletionData),
    /// Payload for `todo.uncompleted`.
    Uncompleted(CompletionData),
}

impl EventData {
    /// Deserialize a JSON string into the correct variant based on the
    /// event type.
    ///
    /// # Errors
    ///
    /// Returns a [`DataParseError`] if the JSON is malformed or does not
    /// match the expected schema for the given event type.
    pub fn deserialize_for(event_type: EventType, json: &str) -> Result<Self, DataParseError> {
        let result = match event_type {
            EventType::Created => serde_json::from_str::<CreatedData>(json).map(EventData::Created),
            EventType::Updated => serde_json::from_str::<UpdatedData>(json).map(EventData::Updated),
            EventType::Deleted => serde_json::from_str::<DeletedData>(json).map(EventData::Deleted),
            EventType::Completed => {
                serde_json::from_str::<CompletionData>(json).map(EventData::Completed)
            }
            EventType::Uncompleted => {
                serde_json::from_str::<CompletionData>(json).map(EventData::Uncompleted)
            }
        };

        result.map_err(|source| DataParseError { event_type, source })
    }

    /// The event type this payload belongs to.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Created(_) => EventType::Created,
            Self::Updated(_) => EventType::Updated,
            Self::Deleted(_) => EventType::Deleted,
            Self::Completed(_) => EventType::Completed,
            Self::Uncompleted(_) => EventType::Uncompleted,
        }
    }

    /// The embedded task record.
    #[must_use]
    pub const fn record(&self) -> &TaskRecord {
        match self {
            Self::Created(d) => &d.task,
            Self::Updated(d) => &d.task,
            Self::Deleted(d) => &d.task,
            Self::Completed(d) | Self::Uncompleted(d) => &d.task,
        }
    }

    /// The id of the task this event is about.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.record().id
    }

    /// The owner of the task this event is about.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.record().user_id
    }
}

impl Serialize for EventData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Created(d) => d.serialize(serializer),
            Self::Updated(d) => d.serialize(serializer),
            Self::Deleted(d) => d.serialize(serializer),
            Self::Completed(d) | Self::Uncompleted(d) => d.serialize(serializer),
        }
    }
}

/// Error returned when deserializing an event's JSON payload fails.
#[derive(Debug)]
pub struct DataParseError {
    /// The event type that was being deserialized.
    pub event_type: EventType,
    /// The underlying JSON parse error.
    pub source: serde_json::Error,
}

impl fmt::Display for DataParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} data payload: {}",
            self.event_type, self.source
        )
    }
}

impl std::error::Error for DataParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: TaskId::generate(),
            owner_id: UserId::generate(),
            title: "Buy milk".into(),
            description: Some("2L, whole".into()),
            completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("valid"),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("valid"),
        }
    }

    #[test]
    fn record_maps_owner_to_user_id() {
        let task = sample_task();
        let record = TaskRecord::from(&task);
        assert_eq!(record.user_id, task.owner_id);
        assert_eq!(record.id, task.id);
    }

    #[test]
    fn flattened_payload_exposes_id_and_user_id_at_top_level() {
        let task = sample_task();
        let data = EventData::Created(CreatedData {
            task: TaskRecord::from(&task),
        });
        let value = serde_json::to_value(&data).expect("serialize");
        let obj = value.as_object().expect("object");
        assert_eq!(obj["id"], serde_json::json!(task.id.to_string()));
        assert_eq!(obj["user_id"], serde_json::json!(task.owner_id.to_string()));
        assert!(obj.contains_key("completed"));
    }

    #[test]
    fn updated_payload_carries_originals() {
        let task = sample_task();
        let data = EventData::Updated(UpdatedData {
            task: TaskRecord::from(&task),
            original_title: "Buy oat milk".into(),
            original_description: None,
        });
        let value = serde_json::to_value(&data).expect("serialize");
        assert_eq!(value["original_title"], "Buy oat milk");
        assert!(value["original_description"].is_null());
        assert_eq!(value["title"], "Buy milk");
    }

    #[test]
    fn deserialize_for_picks_the_variant_from_the_type() {
        let task = sample_task();
        let completion = CompletionData {
            task: TaskRecord::from(&task),
            original_completed: false,
        };
        let json = serde_json::to_string(&completion).expect("serialize");

        let completed =
            EventData::deserialize_for(EventType::Completed, &json).expect("completed");
        assert_eq!(completed.event_type(), EventType::Completed);

        let uncompleted =
            EventData::deserialize_for(EventType::Uncompleted, &json).expect("uncompleted");
        assert_eq!(uncompleted.event_type(), EventType::Uncompleted);
    }

    #[test]
    fn deserialize_for_rejects_mismatched_schema() {
        // An updated payload requires original_title; a bare record lacks it.
        let task = sample_task();
        let json = serde_json::to_string(&TaskRecord::from(&task)).expect("serialize");
        let err = EventData::deserialize_for(EventType::Updated, &json).expect_err("reject");
        assert_eq!(err.event_type, EventType::Updated);
    }
}

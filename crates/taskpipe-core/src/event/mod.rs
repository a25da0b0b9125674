//! Event envelopes for the todo event catalog.
//!
//! This module defines the [`Envelope`] carried to downstream consumers,
//! the [`EventType`] catalog, and typed payload structs. The wire shape is
//! one JSON object per envelope:
//!
//! ```text
//! {"event_type": "todo.created", "data": {...}, "timestamp": "2024-05-01T09:30:00Z"}
//! ```
//!
//! `data` always contains `id` and `user_id` at the top level; the rest of
//! its fields depend on the event type (see [`data`]).
//!
//! Envelopes are immutable once built and are never persisted by the core;
//! delivery is the publisher's concern.

pub mod data;
pub mod types;

pub use data::{
    CompletionData, CreatedData, DataParseError, DeletedData, EventData, TaskRecord, UpdatedData,
};
pub use types::{EventType, UnknownEventType};

use crate::model::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One durable fact about a mutation, handed to a delivery mechanism.
///
/// Built by the typed constructors below; the constructors are the
/// envelope-builder contract. Which snapshots each event type requires is
/// enforced by their signatures — there is no way to build a `todo.updated`
/// envelope without both a before and an after.
///
/// # Serde
///
/// Custom `Deserialize` uses `event_type` to drive typed deserialization of
/// `data`, because the type discriminant is external to the payload JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    /// Which mutation this envelope describes.
    pub event_type: EventType,

    /// Type-specific payload; always includes `id` and `user_id`.
    pub data: EventData,

    /// When the envelope was built. Assigned by the builder, independent of
    /// the task's `updated_at`.
    pub timestamp: DateTime<Utc>,
}

/// Errors that can occur when serializing an envelope for the wire.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The serialized JSON contained a literal newline.
    #[error("envelope JSON contains literal newline, one-line invariant violated")]
    NewlineInPayload,

    /// Failed to serialize the envelope to JSON.
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Envelope {
    /// Envelope for a freshly created task.
    #[must_use]
    pub fn created(task: &Task) -> Self {
        Self::build(EventData::Created(CreatedData {
            task: TaskRecord::from(task),
        }))
    }

    /// Envelope for a content update. `before` and `after` must be
    /// snapshots of the same task taken inside the mutation's transaction.
    #[must_use]
    pub fn updated(before: &Task, after: &Task) -> Self {
        debug_assert_eq!(before.id, after.id);
        Self::build(EventData::Updated(UpdatedData {
            task: TaskRecord::from(after),
            original_title: before.title.clone(),
            original_description: before.description.clone(),
        }))
    }

    /// Envelope for a hard delete; `last_known` is the record as it existed
    /// just before deletion.
    #[must_use]
    pub fn deleted(last_known: &Task) -> Self {
        Self::build(EventData::Deleted(DeletedData {
            task: TaskRecord::from(last_known),
        }))
    }

    /// Envelope for a completion-flag change. Emits `todo.completed` or
    /// `todo.uncompleted` depending on the post-mutation flag.
    #[must_use]
    pub fn completion(before: &Task, after: &Task) -> Self {
        debug_assert_eq!(before.id, after.id);
        let data = CompletionData {
            task: TaskRecord::from(after),
            original_completed: before.completed,
        };
        Self::build(if after.completed {
            EventData::Completed(data)
        } else {
            EventData::Uncompleted(data)
        })
    }

    fn build(data: EventData) -> Self {
        Self {
            event_type: data.event_type(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to a single JSON line (without trailing newline).
    ///
    /// Publishers that append to line-oriented logs rely on the one-line
    /// invariant; serde_json never emits raw newlines, but the invariant is
    /// enforced here rather than assumed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::NewlineInPayload`] if the JSON contains a
    /// literal newline, or [`WireError::Serialize`] on serialization
    /// failure.
    pub fn to_json_line(&self) -> Result<String, WireError> {
        let line = serde_json::to_string(self)?;
        if line.contains('\n') {
            return Err(WireError::NewlineInPayload);
        }
        Ok(line)
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        /// Two-pass deserialization: read `event_type` first, then use it
        /// to pick the payload schema.
        #[derive(Deserialize)]
        struct EnvelopeRaw {
            event_type: EventType,
            data: serde_json::Value,
            timestamp: DateTime<Utc>,
        }

        let raw = EnvelopeRaw::deserialize(deserializer)?;
        let data_json = raw.data.to_string();
        let data = EventData::deserialize_for(raw.event_type, &data_json)
            .map_err(serde::de::Error::custom)?;

        Ok(Self {
            event_type: raw.event_type,
            data,
            timestamp: raw.timestamp,
        })
    }
}

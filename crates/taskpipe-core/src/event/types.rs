//! Event type enum for the todo event catalog.
//!
//! Each event type corresponds to one mutation outcome. The string
//! representation uses the `todo.<verb>` dotted format carried on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five event types in the todo event catalog.
///
/// Toggling completion emits [`Completed`](Self::Completed) or
/// [`Uncompleted`](Self::Uncompleted) depending on the post-mutation flag;
/// there is no generic "toggled" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A task was created.
    Created,
    /// Title and/or description changed.
    Updated,
    /// A task was hard-deleted.
    Deleted,
    /// The completion flag became `true`.
    Completed,
    /// The completion flag became `false`.
    Uncompleted,
}

/// Error returned when parsing an unknown event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event type '{}': expected one of todo.created, todo.updated, \
             todo.deleted, todo.completed, todo.uncompleted",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventType {}

impl EventType {
    /// All known event types in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::Updated,
        Self::Deleted,
        Self::Completed,
        Self::Uncompleted,
    ];

    /// Return the canonical `todo.<verb>` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "todo.created",
            Self::Updated => "todo.updated",
            Self::Deleted => "todo.deleted",
            Self::Completed => "todo.completed",
            Self::Uncompleted => "todo.uncompleted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo.created" => Ok(Self::Created),
            "todo.updated" => Ok(Self::Updated),
            "todo.deleted" => Ok(Self::Deleted),
            "todo.completed" => Ok(Self::Completed),
            "todo.uncompleted" => Ok(Self::Uncompleted),
            _ => Err(UnknownEventType { raw: s.to_string() }),
        }
    }
}

// Custom serde: serialize as the `todo.<verb>` string.
impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

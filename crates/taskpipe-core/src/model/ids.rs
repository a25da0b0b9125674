//! Identifier newtypes for tasks and users.
//!
//! Both wrap a v4 UUID. The newtypes exist so a task id can never be passed
//! where an owner id is expected — the ownership guard compares `UserId` to
//! `UserId` only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when parsing an id string fails.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} id '{raw}': {source}")]
pub struct ParseIdError {
    /// Which id kind was being parsed (`task` or `user`).
    pub kind: &'static str,
    /// The unparseable input.
    pub raw: String,
    source: uuid::Error,
}

macro_rules! uuid_id {
    ($name:ident, $kind:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Hyphenated lowercase, the same form the wire contract uses.
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|source| ParseIdError {
                    kind: $kind,
                    raw: s.to_string(),
                    source,
                })
            }
        }
    };
}

uuid_id!(TaskId, "task", "Unique identifier of a task, assigned at creation.");
uuid_id!(UserId, "user", "Identifier of an authenticated user / task owner.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        let id = UserId::generate();
        let parsed: UserId = id.to_string().parse().expect("parse own display output");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_error_names_the_kind() {
        let err = "not-a-uuid".parse::<TaskId>().expect_err("must not parse");
        assert_eq!(err.kind, "task");
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn serde_is_transparent() {
        let id = TaskId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
        let back: TaskId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }

    #[test]
    fn task_and_user_ids_are_distinct_types() {
        // Compile-time property; the assert just keeps the test body non-empty.
        let task = TaskId::generate();
        let user = UserId::from_uuid(task.as_uuid());
        assert_eq!(task.as_uuid(), user.as_uuid());
    }
}

//! Task record and mutation inputs.
//!
//! Validation limits match the service contract: titles are non-empty and at
//! most [`MAX_TITLE_LEN`] characters, descriptions at most
//! [`MAX_DESCRIPTION_LEN`]. Limits are counted in characters, not bytes, so
//! multi-byte titles are not penalized.

use super::ids::{TaskId, UserId};
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// One todo item, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. Validated before any write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
}

impl TaskDraft {
    /// Build a draft from a title and optional description.
    #[must_use]
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }

    /// Check the draft against the title/description limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the title is empty or overlong, or
    /// the description is overlong.
    pub fn validate(&self) -> Result<(), Error> {
        validate_title(&self.title)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

/// Partial update for a task. `None` fields retain their prior value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TaskPatch {
    /// True when the patch changes no content fields.
    ///
    /// A no-op patch is still a mutation: `updated_at` refreshes regardless.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Check provided fields against the limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a provided title is empty or
    /// overlong, or a provided description is overlong.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}

/// Listing filter over the completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Every task for the owner.
    #[default]
    All,
    /// Only tasks with `completed = true`.
    Completed,
    /// Only tasks with `completed = false`.
    Pending,
}

impl TaskFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown filter string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task filter '{raw}': expected one of all, completed, pending")]
pub struct UnknownFilter {
    /// The unrecognised input string.
    pub raw: String,
}

impl FromStr for TaskFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            _ => Err(UnknownFilter { raw: s.to_string() }),
        }
    }
}

fn validate_title(title: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".to_string()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(Error::Validation(format!(
            "title is {len} characters, maximum is {MAX_TITLE_LEN}"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), Error> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "description is {len} characters, maximum is {MAX_DESCRIPTION_LEN}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(title, None)
    }

    #[test]
    fn empty_title_is_rejected() {
        assert!(matches!(draft("").validate(), Err(Error::Validation(_))));
        assert!(matches!(draft("   ").validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn title_at_limit_is_accepted() {
        let title = "x".repeat(MAX_TITLE_LEN);
        assert!(draft(&title).validate().is_ok());
    }

    #[test]
    fn title_over_limit_is_rejected() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            draft(&title).validate(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn limits_are_counted_in_characters() {
        // 255 multi-byte characters is within the limit even though the
        // byte length is far larger.
        let title = "ü".repeat(MAX_TITLE_LEN);
        assert!(draft(&title).validate().is_ok());
    }

    #[test]
    fn overlong_description_is_rejected() {
        let d = TaskDraft::new("ok", Some("y".repeat(MAX_DESCRIPTION_LEN + 1)));
        assert!(matches!(d.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn patch_with_no_fields_is_noop_and_valid() {
        let patch = TaskPatch::default();
        assert!(patch.is_noop());
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn patch_with_empty_title_is_rejected() {
        let patch = TaskPatch {
            title: Some(String::new()),
            description: None,
        };
        assert!(matches!(patch.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn filter_parses_and_displays() {
        for filter in [TaskFilter::All, TaskFilter::Completed, TaskFilter::Pending] {
            let parsed: TaskFilter = filter.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, filter);
        }
        assert!("done".parse::<TaskFilter>().is_err());
    }
}

//! Error taxonomy for the mutation pipeline.
//!
//! Two families, deliberately separate:
//!
//! - [`Error`] — failures the caller sees: authorization, validation, and
//!   missing resources, plus storage faults. These abort the pipeline.
//! - [`DownstreamError`] — publish/projection failures. These are returned
//!   as values from the side-effect ports, logged by the pipeline, and
//!   never propagated to the caller.

use std::fmt;

/// Caller-visible errors. Only these ever cross the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad input shape or content; user-correctable.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The task does not exist under the requested owner. Deliberately the
    /// same for "absent" and "owned by someone else" so cross-owner lookups
    /// do not leak existence.
    #[error("todo not found")]
    NotFound,

    /// Acting identity does not own the target resource. Raised before any
    /// data is touched, so it reveals nothing about whether the resource
    /// exists.
    #[error("not authorized to access this user's todos")]
    Forbidden,

    /// Primary-store fault (connection, SQL, corruption).
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl Error {
    /// Machine-readable code for the wire contract's `error_code` field.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Storage(_) => "internal_error",
        }
    }

    /// HTTP-equivalent status for the routing layer.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::Storage(_) => 500,
        }
    }
}

/// Failure of a best-effort side effect. Terminal for its own step only:
/// the pipeline records it, logs it, and responds as if it had succeeded.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// Event delivery to the bus failed.
    #[error("event publish failed: {0}")]
    Publish(#[source] anyhow::Error),

    /// Mirroring state into the projection sink failed.
    #[error("state projection failed: {0}")]
    Project(#[source] anyhow::Error),
}

impl DownstreamError {
    /// The pipeline step this failure belongs to, for log fields.
    #[must_use]
    pub const fn step(&self) -> Step {
        match self {
            Self::Publish(_) => Step::Publish,
            Self::Project(_) => Step::Project,
        }
    }
}

/// The two advisory steps of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Publish,
    Project,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Publish => "publish",
            Self::Project => "project",
        })
    }
}

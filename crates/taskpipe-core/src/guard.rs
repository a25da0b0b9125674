//! Ownership guard.
//!
//! The single authorization rule of the system: an identity may operate on
//! a user's todos if and only if it *is* that user. No roles, no
//! delegation. Every pipeline entry point — reads included — calls
//! [`authorize`] before touching the repository.

use crate::error::Error;
use crate::model::UserId;

/// Check that `actor` may operate on resources owned by `owner`.
///
/// Pure equality; fails closed. Because both sides are typed [`UserId`]s,
/// format mismatches are unrepresentable — anything that failed to parse as
/// a UUID was rejected before reaching this point.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] on any mismatch.
pub fn authorize(actor: UserId, owner: UserId) -> Result<(), Error> {
    if actor == owner {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

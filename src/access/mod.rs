//! Membership resolution and the authorization gate.
//!
//! Every handler reads authorization state from the store immediately
//! before acting on it; nothing is cached between requests and no lock
//! spans the check and the following mutation.

pub mod db;
mod role;

pub use db::accessible_calendar_ids;
pub use role::Role;

use anyhow::Result;
use tokio_rusqlite::Connection;

use crate::api::public::ApiError;

/// Outcome of resolving a user's rights on a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The calendar does not exist.
    MissingCalendar,
    /// The calendar exists but the user has no accepted membership.
    NoAccess,
    /// The user's effective role.
    Role(Role),
}

/// Resolve the user's effective role on a calendar: `Owner` when they own
/// it, otherwise the role of their accepted membership row.
pub async fn effective_role(
    db: &Connection,
    calendar_id: &str,
    user_id: &str,
) -> Result<Access> {
    let Some(owner_id) = db::calendar_owner(db, calendar_id).await? else {
        return Ok(Access::MissingCalendar);
    };
    if owner_id == user_id {
        return Ok(Access::Role(Role::Owner));
    }
    match db::member_role(db, calendar_id, user_id).await? {
        Some(role) => Ok(Access::Role(role)),
        None => Ok(Access::NoAccess),
    }
}

/// Require at least `min` on the calendar. Missing calendars surface as
/// `NotFound`, insufficient or absent membership as `Forbidden`.
pub async fn require_role(
    db: &Connection,
    calendar_id: &str,
    user_id: &str,
    min: Role,
) -> Result<Role, ApiError> {
    match effective_role(db, calendar_id, user_id).await? {
        Access::MissingCalendar => Err(ApiError::NotFound("calendar not found")),
        Access::Role(role) if role >= min => Ok(role),
        Access::Role(_) | Access::NoAccess => {
            tracing::warn!(calendar_id, user_id, required = %min, "authorization denied");
            Err(ApiError::Forbidden)
        }
    }
}

//! Database queries backing the membership resolver and authorization gate

use std::collections::HashSet;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::Role;

/// Every calendar id the user may access: calendars they own plus
/// calendars where they hold an accepted membership row.
pub async fn accessible_calendar_ids(
    db: &Connection,
    user_id: &str,
) -> Result<HashSet<String>, Error> {
    let user_id = user_id.to_string();
    let ids = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id FROM calendar WHERE owner_id = ?1
                UNION
                SELECT calendar_id FROM calendar_member
                WHERE user_id = ?1 AND accepted = 1
                "#,
            )?;
            let ids = stmt
                .query_map([&user_id], |row| row.get::<_, String>(0))?
                .filter_map(Result::ok)
                .collect::<HashSet<String>>();
            Ok(ids)
        })
        .await?;
    Ok(ids)
}

/// The calendar's owner id, or `None` when the calendar does not exist.
pub async fn calendar_owner(
    db: &Connection,
    calendar_id: &str,
) -> Result<Option<String>, Error> {
    let calendar_id = calendar_id.to_string();
    let owner = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT owner_id FROM calendar WHERE id = ?1")?;
            let mut rows = stmt.query_map([&calendar_id], |row| row.get::<_, String>(0))?;
            Ok(rows.next().transpose()?)
        })
        .await?;
    Ok(owner)
}

/// The role of an accepted membership row, if any.
pub async fn member_role(
    db: &Connection,
    calendar_id: &str,
    user_id: &str,
) -> Result<Option<Role>, Error> {
    let calendar_id = calendar_id.to_string();
    let user_id = user_id.to_string();
    let role = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT role FROM calendar_member
                 WHERE calendar_id = ?1 AND user_id = ?2 AND accepted = 1",
            )?;
            let mut rows = stmt.query_map([&calendar_id, &user_id], |row| row.get::<_, Role>(0))?;
            Ok(rows.next().transpose()?)
        })
        .await?;
    Ok(role)
}

//! Database queries for the calendars API
use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};

use super::public::CalendarSummary;
use crate::access::Role;

/// Every calendar visible to the user with their effective role. A
/// calendar owner also holds an implicit membership row; the union keeps
/// a single entry per calendar with the owner role winning.
pub async fn list_for_user(db: &Connection, user_id: &str) -> Result<Vec<CalendarSummary>, Error> {
    let user_id = user_id.to_string();
    let calendars = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT c.id, c.name, 'owner' AS role
                FROM calendar c
                WHERE c.owner_id = ?1
                UNION
                SELECT c.id, c.name, m.role
                FROM calendar c
                JOIN calendar_member m ON m.calendar_id = c.id
                WHERE m.user_id = ?1 AND m.accepted = 1 AND c.owner_id != ?1
                ORDER BY name
                "#,
            )?;
            let calendars = stmt
                .query_map([&user_id], |row| {
                    Ok(CalendarSummary {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        role: row.get::<_, Role>(2)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            Ok(calendars)
        })
        .await?;
    Ok(calendars)
}

/// Insert the calendar and its implicit owner membership row in one
/// transaction so a partial create can never be observed.
pub async fn create_with_owner(
    db: &Connection,
    id: &str,
    name: &str,
    owner_id: &str,
) -> Result<(), Error> {
    let id = id.to_string();
    let name = name.to_string();
    let owner_id = owner_id.to_string();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO calendar (id, name, owner_id) VALUES (?1, ?2, ?3)",
            params![id, name, owner_id],
        )?;
        tx.execute(
            r#"
            INSERT INTO calendar_member (calendar_id, user_id, role, accepted)
            VALUES (?1, ?2, 'owner', 1)
            ON CONFLICT (calendar_id, user_id)
            DO UPDATE SET role = 'owner', accepted = 1
            "#,
            params![id, owner_id],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn rename(db: &Connection, calendar_id: &str, name: &str) -> Result<(), Error> {
    let calendar_id = calendar_id.to_string();
    let name = name.to_string();
    db.call(move |conn| {
        conn.execute(
            "UPDATE calendar SET name = ?1 WHERE id = ?2",
            params![name, calendar_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Delete the calendar; members and events go with it via the foreign
/// key cascade.
pub async fn delete(db: &Connection, calendar_id: &str) -> Result<(), Error> {
    let calendar_id = calendar_id.to_string();
    db.call(move |conn| {
        conn.execute("DELETE FROM calendar WHERE id = ?1", [&calendar_id])?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Instant-join membership upsert: re-inviting the same user updates
/// the role in place.
pub async fn upsert_member(
    db: &Connection,
    calendar_id: &str,
    user_id: &str,
    role: Role,
) -> Result<(), Error> {
    let calendar_id = calendar_id.to_string();
    let user_id = user_id.to_string();
    db.call(move |conn| {
        conn.execute(
            r#"
            INSERT INTO calendar_member (calendar_id, user_id, role, accepted)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT (calendar_id, user_id)
            DO UPDATE SET role = excluded.role, accepted = 1
            "#,
            params![calendar_id, user_id, role],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

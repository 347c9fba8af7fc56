//! Database queries for the events API
use anyhow::{Error, Result};
use serde_json::json;
use tokio_rusqlite::{Connection, params};

use super::public::{EventKind, EventStatus};

/// An event as stored, before member resolution.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: String,
    pub calendar_id: String,
    pub owner_id: String,
    pub title: String,
    pub status: EventStatus,
    pub date: String,
    pub time: Option<String>,
    pub kind: EventKind,
}

/// A profile row as needed for member resolution.
#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

const EVENT_COLUMNS: &str = "id, calendar_id, owner_id, title, status, date, time, kind";

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        owner_id: row.get(2)?,
        title: row.get(3)?,
        status: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        kind: row.get(7)?,
    })
}

pub async fn get_event(db: &Connection, id: &str) -> Result<Option<EventRow>, Error> {
    let id = id.to_string();
    let event = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM event WHERE id = ?1",
                EVENT_COLUMNS
            ))?;
            let mut rows = stmt.query_map([&id], event_from_row)?;
            Ok(rows.next().transpose()?)
        })
        .await?;
    Ok(event)
}

/// All events in the given calendars, earliest date first.
pub async fn list_events(
    db: &Connection,
    calendar_ids: Vec<String>,
) -> Result<Vec<EventRow>, Error> {
    let ids_json = json!(calendar_ids).to_string();
    let events = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                r#"
                SELECT {}
                FROM event
                WHERE calendar_id IN (SELECT value FROM json_each(?1))
                ORDER BY date ASC
                "#,
                EVENT_COLUMNS
            ))?;
            let events = stmt
                .query_map([ids_json.as_str()], event_from_row)?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            Ok(events)
        })
        .await?;
    Ok(events)
}

pub async fn insert_event(db: &Connection, event: EventRow) -> Result<(), Error> {
    db.call(move |conn| {
        conn.execute(
            r#"
            INSERT INTO event (id, calendar_id, owner_id, title, status, date, time, kind)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                event.id,
                event.calendar_id,
                event.owner_id,
                event.title,
                event.status,
                event.date,
                event.time,
                event.kind
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Write back the mutable fields of an event after a partial update has
/// been merged onto the stored row.
pub async fn update_event(db: &Connection, event: EventRow) -> Result<(), Error> {
    db.call(move |conn| {
        conn.execute(
            r#"
            UPDATE event
            SET title = ?1, status = ?2, date = ?3, time = ?4, kind = ?5
            WHERE id = ?6
            "#,
            params![
                event.title,
                event.status,
                event.date,
                event.time,
                event.kind,
                event.id
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn delete_event(db: &Connection, id: &str) -> Result<(), Error> {
    let id = id.to_string();
    db.call(move |conn| {
        conn.execute("DELETE FROM event WHERE id = ?1", [&id])?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Profiles of every accepted member of a calendar, in store order.
pub async fn accepted_member_profiles(
    db: &Connection,
    calendar_id: &str,
) -> Result<Vec<ProfileRow>, Error> {
    let calendar_id = calendar_id.to_string();
    let profiles = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT p.id, p.full_name, p.avatar_url
                FROM calendar_member m
                JOIN profile p ON p.id = m.user_id
                WHERE m.calendar_id = ?1 AND m.accepted = 1
                "#,
            )?;
            let profiles = stmt
                .query_map([&calendar_id], |row| {
                    Ok(ProfileRow {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        avatar_url: row.get(2)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            Ok(profiles)
        })
        .await?;
    Ok(profiles)
}

pub async fn profile_by_id(db: &Connection, user_id: &str) -> Result<Option<ProfileRow>, Error> {
    let user_id = user_id.to_string();
    let profile = db
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, full_name, avatar_url FROM profile WHERE id = ?1")?;
            let mut rows = stmt.query_map([&user_id], |row| {
                Ok(ProfileRow {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    avatar_url: row.get(2)?,
                })
            })?;
            Ok(rows.next().transpose()?)
        })
        .await?;
    Ok(profile)
}

//! Public types for the events API
use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Event status as shown in the client UI. `Tek` is a personal event,
/// `Birlikte` a shared one; the pairing with [`EventKind`] is enforced
/// at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Tek,
    Birlikte,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Tek => "Tek",
            EventStatus::Birlikte => "Birlikte",
        }
    }

    /// The event kind this status implies.
    pub fn derived_kind(&self) -> EventKind {
        match self {
            EventStatus::Tek => EventKind::Single,
            EventStatus::Birlikte => EventKind::Collaborative,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tek" => Ok(EventStatus::Tek),
            "Birlikte" => Ok(EventStatus::Birlikte),
            other => Err(anyhow::anyhow!("unknown event status: {}", other)),
        }
    }
}

impl ToSql for EventStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EventStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

/// Whether an event belongs to its owner alone or is visible to every
/// accepted member of its calendar. Serialized as `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Single,
    Collaborative,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Single => "single",
            EventKind::Collaborative => "collaborative",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(EventKind::Single),
            "collaborative" => Ok(EventKind::Collaborative),
            other => Err(anyhow::anyhow!("unknown event type: {}", other)),
        }
    }
}

impl ToSql for EventKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EventKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

/// One entry in an event's materialized member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMember {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// The client-facing representation of an event. Members are derived at
/// read time, never stored.
#[derive(Debug, Serialize)]
pub struct EventView {
    pub id: String,
    pub calendar_id: String,
    pub owner_id: String,
    pub title: String,
    pub status: EventStatus,
    pub date: String,
    pub day: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub members: Vec<EventMember>,
}

#[derive(Debug, Serialize)]
pub struct EventList {
    pub events: Vec<EventView>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: EventView,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(rename = "calendarId")]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub calendar_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

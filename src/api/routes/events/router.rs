//! Router for the events API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_extra::extract::Query;
use serde_json::{Value, json};
use uuid::Uuid;

use super::materialize::{materialize, parse_date};
use super::public;
use super::public::{EventKind, EventStatus};
use crate::access::{self, Access, Role};
use crate::api::auth::AuthedUser;
use crate::api::public::ApiError;
use crate::api::routes::events::db as events_db;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// The status/type pairing is a single fact expressed twice on the
/// wire; a write may omit the type but may not contradict the status.
fn resolve_kind(status: EventStatus, kind: Option<EventKind>) -> Result<EventKind, ApiError> {
    let derived = status.derived_kind();
    match kind {
        None => Ok(derived),
        Some(kind) if kind == derived => Ok(kind),
        Some(_) => Err(ApiError::InvalidInput("status and type disagree")),
    }
}

fn parse_status(raw: &str) -> Result<EventStatus, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidInput("invalid status"))
}

fn parse_kind(raw: Option<&str>) -> Result<Option<EventKind>, ApiError> {
    raw.map(|raw| {
        raw.parse()
            .map_err(|_| ApiError::InvalidInput("invalid type"))
    })
    .transpose()
}

/// Editor or better on the event's calendar; anything else, including
/// an unknown calendar, reads as forbidden to the caller.
async fn require_editor(
    db: &tokio_rusqlite::Connection,
    calendar_id: &str,
    user_id: &str,
) -> Result<(), ApiError> {
    match access::effective_role(db, calendar_id, user_id).await? {
        Access::Role(role) if role >= Role::Editor => Ok(()),
        _ => {
            tracing::warn!(calendar_id, user_id, "event mutation denied");
            Err(ApiError::Forbidden)
        }
    }
}

// List events endpoint. Scoped to the caller's accessible calendars; an
// inaccessible calendarId filter yields an empty list, not an error.
async fn list_events(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Query(params): Query<public::EventsQuery>,
) -> Result<Json<public::EventList>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let allowed = access::accessible_calendar_ids(&db, &user.user_id).await?;
    let targets: Vec<String> = match params.calendar_id {
        Some(id) if allowed.contains(&id) => vec![id],
        Some(_) => return Ok(Json(public::EventList { events: vec![] })),
        None if allowed.is_empty() => {
            return Ok(Json(public::EventList { events: vec![] }));
        }
        None => allowed.into_iter().collect(),
    };

    let rows = events_db::list_events(&db, targets).await?;
    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        events.push(materialize(&db, row).await?);
    }

    Ok(Json(public::EventList { events }))
}

// Create event endpoint
async fn create_event(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Json(req): Json<public::CreateEventRequest>,
) -> Result<Json<public::EventResponse>, ApiError> {
    let (Some(title), Some(status), Some(date), Some(calendar_id)) = (
        req.title.as_deref().map(str::trim).filter(|t| !t.is_empty()),
        req.status.as_deref(),
        req.date.as_deref(),
        req.calendar_id.as_deref(),
    ) else {
        return Err(ApiError::InvalidInput("Missing required fields"));
    };

    let status = parse_status(status)?;
    let kind = resolve_kind(status, parse_kind(req.kind.as_deref())?)?;
    let Some(date) = parse_date(date) else {
        return Err(ApiError::InvalidInput("invalid date"));
    };

    let db = state.read().unwrap().db.clone();
    require_editor(&db, calendar_id, &user.user_id).await?;

    let row = events_db::EventRow {
        id: req.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        calendar_id: calendar_id.to_string(),
        owner_id: user.user_id.clone(),
        title: title.to_string(),
        status,
        date: date.format("%Y-%m-%d").to_string(),
        time: req.time,
        kind,
    };
    events_db::insert_event(&db, row.clone()).await?;

    let event = materialize(&db, row).await?;
    Ok(Json(public::EventResponse { event }))
}

// View event endpoint, for any accepted member of its calendar
async fn view_event(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<public::EventResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let Some(row) = events_db::get_event(&db, &id).await? else {
        return Err(ApiError::NotFound("not found"));
    };
    let allowed = access::accessible_calendar_ids(&db, &user.user_id).await?;
    if !allowed.contains(&row.calendar_id) {
        return Err(ApiError::Forbidden);
    }

    let event = materialize(&db, row).await?;
    Ok(Json(public::EventResponse { event }))
}

// Update event endpoint. Partial: absent fields keep their stored
// values; a status change without an explicit type re-derives it.
async fn update_event(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<String>,
    Json(req): Json<public::UpdateEventRequest>,
) -> Result<Json<public::EventResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let Some(mut row) = events_db::get_event(&db, &id).await? else {
        return Err(ApiError::NotFound("not found"));
    };
    require_editor(&db, &row.calendar_id, &user.user_id).await?;

    if let Some(title) = req.title {
        row.title = title;
    }
    if let Some(time) = req.time {
        row.time = Some(time);
    }
    if let Some(date) = req.date.as_deref() {
        let Some(date) = parse_date(date) else {
            return Err(ApiError::InvalidInput("invalid date"));
        };
        row.date = date.format("%Y-%m-%d").to_string();
    }

    let status_changed = req.status.is_some();
    if let Some(status) = req.status.as_deref() {
        row.status = parse_status(status)?;
    }
    match parse_kind(req.kind.as_deref())? {
        Some(kind) => row.kind = resolve_kind(row.status, Some(kind))?,
        None if status_changed => row.kind = row.status.derived_kind(),
        None => {}
    }

    events_db::update_event(&db, row.clone()).await?;

    let event = materialize(&db, row).await?;
    Ok(Json(public::EventResponse { event }))
}

// Delete event endpoint. Idempotent: deleting an unknown id reports ok.
async fn delete_event(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let Some(row) = events_db::get_event(&db, &id).await? else {
        return Ok(Json(json!({ "ok": true })));
    };
    require_editor(&db, &row.calendar_id, &user.user_id).await?;
    events_db::delete_event(&db, &id).await?;

    Ok(Json(json!({ "ok": true })))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(view_event).patch(update_event).delete(delete_event),
        )
}

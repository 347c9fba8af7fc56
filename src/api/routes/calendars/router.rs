//! Router for the calendars API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use uuid::Uuid;

use super::public;
use crate::access::{self, Access, Role};
use crate::api::auth::{AuthedUser, MaybeUser};
use crate::api::public::ApiError;
use crate::api::routes::calendars::db as calendars_db;
use crate::api::routes::profile::db as profile_db;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

// List calendars endpoint. Anonymous callers get an empty list rather
// than a 401 so the client can render its signed-out state.
async fn list_calendars(
    State(state): State<SharedState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<public::CalendarList>, ApiError> {
    let Some(user) = user else {
        return Ok(Json(public::CalendarList { calendars: vec![] }));
    };

    let db = state.read().unwrap().db.clone();
    let calendars = calendars_db::list_for_user(&db, &user.user_id).await?;
    Ok(Json(public::CalendarList { calendars }))
}

// Create calendar endpoint. The caller becomes the owner and receives
// the implicit owner membership row.
async fn create_calendar(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Json(req): Json<public::CreateCalendarRequest>,
) -> Result<Json<public::CalendarResponse>, ApiError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name required"));
    }
    let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let db = state.read().unwrap().db.clone();
    calendars_db::create_with_owner(&db, &id, name, &user.user_id).await?;

    Ok(Json(public::CalendarResponse {
        calendar: public::CalendarSummary {
            id,
            name: name.to_string(),
            role: Role::Owner,
        },
    }))
}

// Rename calendar endpoint, for owners and editors
async fn rename_calendar(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(calendar_id): Path<String>,
    Json(req): Json<public::RenameCalendarRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("name required"));
    }

    let db = state.read().unwrap().db.clone();
    access::require_role(&db, &calendar_id, &user.user_id, Role::Editor).await?;
    calendars_db::rename(&db, &calendar_id, name).await?;

    Ok(Json(json!({ "ok": true, "name": name })))
}

// Delete calendar endpoint. Only the owner may delete; anything else,
// including an unknown id, is forbidden.
async fn delete_calendar(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(calendar_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let db = state.read().unwrap().db.clone();
    match access::effective_role(&db, &calendar_id, &user.user_id).await? {
        Access::Role(Role::Owner) => {}
        _ => return Err(ApiError::Forbidden),
    }
    calendars_db::delete(&db, &calendar_id).await?;

    Ok(Json(json!({ "ok": true })))
}

// Invite endpoint. Instant-join: the invitee must already have a
// profile and becomes an accepted member immediately.
async fn invite_member(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
    Path(calendar_id): Path<String>,
    Json(req): Json<public::InviteRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = req
        .email
        .as_deref()
        .map(|email| email.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        return Err(ApiError::InvalidInput("email required"));
    }
    let role = match req.role.as_deref() {
        None => Role::Editor,
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::InvalidInput("invalid role"))?,
    };

    let db = state.read().unwrap().db.clone();
    access::require_role(&db, &calendar_id, &user.user_id, Role::Editor).await?;

    let Some(profile_id) = profile_db::profile_id_by_email(&db, &email).await? else {
        return Err(ApiError::NotFound("user not found"));
    };
    calendars_db::upsert_member(&db, &calendar_id, &profile_id, role).await?;

    Ok(Json(json!({ "ok": true })))
}

/// Create the calendars router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_calendars).post(create_calendar))
        .route("/{id}", patch(rename_calendar).delete(delete_calendar))
        .route("/{id}/invite", post(invite_member))
}

//! Router for the profile API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};

use crate::api::auth::AuthedUser;
use crate::api::public::ApiError;
use crate::api::routes::profile::db as profile_db;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

// Profile sync endpoint. Everything comes from the verified identity;
// the email is lowercased so invite lookups are case-insensitive.
async fn sync_profile(
    State(state): State<SharedState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<Value>, ApiError> {
    let email = user.email.map(|email| email.trim().to_lowercase());
    let full_name = user.full_name.or_else(|| email.clone());

    let db = state.read().unwrap().db.clone();
    profile_db::upsert_profile(&db, &user.user_id, email, full_name, user.avatar_url).await?;

    Ok(Json(json!({ "ok": true })))
}

/// Create the profile router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(sync_profile))
}

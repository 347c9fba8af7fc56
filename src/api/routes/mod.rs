//! API routes module

pub mod calendars;
pub mod events;
pub mod profile;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Calendar routes
        .nest("/calendars", calendars::router())
        // Event routes
        .nest("/events", events::router())
        // Profile sync routes
        .nest("/profile", profile::router())
}

//! Bearer-token authentication extractors.
//!
//! Every identity comes from the external provider; the token is passed
//! through on each request and verified against fresh provider state.

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use http::header;
use http::request::Parts;

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::identity::Identity;

type SharedState = Arc<RwLock<AppState>>;

/// A verified caller. Extraction rejects with 401 when the bearer token
/// is missing or the provider does not recognize it.
pub struct AuthedUser(pub Identity);

/// Like [`AuthedUser`] but never rejects. Endpoints that degrade to an
/// empty response for anonymous callers use this instead.
pub struct MaybeUser(pub Option<Identity>);

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

async fn verify(parts: &Parts, state: &SharedState) -> Result<Option<Identity>, ApiError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };
    let identity = state.read().unwrap().identity.clone();
    Ok(identity.verify_session(&token).await?)
}

impl FromRequestParts<SharedState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match verify(parts, state).await? {
            Some(identity) => Ok(AuthedUser(identity)),
            None => Err(ApiError::Unauthenticated),
        }
    }
}

impl FromRequestParts<SharedState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(verify(parts, state).await.unwrap_or(None)))
    }
}

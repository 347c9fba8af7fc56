//! Client for the external identity provider. Sessions are verified by
//! passing the caller's bearer token through to the provider; the provider
//! is the only source of user ids.

use anyhow::{Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// A verified identity as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Verify a bearer session token. Returns `None` when the provider
    /// rejects the token and an error when the provider is unreachable or
    /// responds with anything other than a verification result.
    pub async fn verify_session(&self, token: &str) -> Result<Option<Identity>> {
        let resp = self
            .http
            .get(format!("{}/v1/session", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json::<Identity>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(anyhow!("identity provider returned {}", status)),
        }
    }
}

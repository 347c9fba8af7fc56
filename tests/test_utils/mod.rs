//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};
use http::Request;
use serde_json::{Value, json};
use tempfile::TempDir;

use takvim::api::AppState;
use takvim::api::app;
use takvim::core::AppConfig;
use takvim::core::db::{async_db, initialize_db};
use takvim::identity::IdentityClient;

/// A test application backed by a temporary database and a mock
/// identity provider. Tokens registered via [`TestApp::register_user`]
/// verify successfully; every other bearer token is rejected.
pub struct TestApp {
    pub app: Router,
    pub identity: mockito::ServerGuard,
    // Mock handles are kept alive for the fixture's lifetime
    mocks: Vec<mockito::Mock>,
    _tmp: TempDir,
}

pub async fn test_app() -> TestApp {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = tmp.path().join("takvim.db");
    let db_path_str = db_path.to_str().unwrap();

    let db = async_db(db_path_str)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();

    let identity = mockito::Server::new_async().await;

    let app_config = AppConfig {
        storage_path: tmp.path().display().to_string(),
        db_path: db_path_str.to_string(),
        identity_api_url: identity.url(),
    };
    let identity_client = IdentityClient::new(&identity.url());
    let app_state = AppState::new(db, app_config, identity_client);

    TestApp {
        app: app(Arc::new(RwLock::new(app_state))),
        identity,
        mocks: vec![],
        _tmp: tmp,
    }
}

impl TestApp {
    /// Make the identity provider reject `token` as unauthenticated.
    pub async fn register_invalid_token(&mut self, token: &str) {
        let mock = self
            .identity
            .mock("GET", "/v1/session")
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(json!({ "error": "unauthorized" }).to_string())
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    /// Make the identity provider recognize `token` as the given user.
    pub async fn register_user(&mut self, token: &str, user_id: &str, email: &str, name: &str) {
        let mock = self
            .identity
            .mock("GET", "/v1/session")
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "user_id": user_id,
                    "email": email,
                    "full_name": name,
                    "avatar_url": null,
                })
                .to_string(),
            )
            .create_async()
            .await;
        self.mocks.push(mock);
    }
}

/// Build a request with an optional bearer token and JSON body.
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not utf-8")
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).expect("Response body was not JSON")
}

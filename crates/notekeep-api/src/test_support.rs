//! Helpers for driving the full router in tests

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use notekeep_auth::JwtManager;
use notekeep_db::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

/// Router backed by a fresh in-memory database
pub(crate) struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let jwt = Arc::new(JwtManager::new("test-secret", Duration::days(7)));
        let state = AppState::new(db, jwt, None);
        Self {
            router: create_router(state.clone(), None),
            state,
        }
    }

    /// Send a JSON request, returning status and parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        self.send_raw(method, uri, token, &body).await
    }

    /// Send a raw body with a JSON content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

/// Register a user through the API, returning `(token, user_id)`
pub(crate) async fn register_user(
    app: &TestApp,
    name: &str,
    email: &str,
    password: &str,
) -> (String, String) {
    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": name, "email": email, "password": password})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

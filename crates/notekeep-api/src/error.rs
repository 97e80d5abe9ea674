//! API error types
//!
//! `ApiError` is the single place where failures become HTTP responses. Every
//! body has the shape `{"message": "..."}`; store and internal failures are
//! logged and reported to the client only as a generic server error.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notekeep_auth::{AuthError, NOT_AUTHORIZED};
use notekeep_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

const SERVER_ERROR: &str = "Server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl ApiError {
    fn internal(&self) -> (StatusCode, String) {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Database(e) => match e {
                DbError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                _ => self.internal(),
            },
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials => {
                    (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
                }
                e if e.is_internal() => self.internal(),
                _ => (StatusCode::UNAUTHORIZED, NOT_AUTHORIZED.to_string()),
            },
            ApiError::Json(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

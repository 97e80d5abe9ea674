//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned for every authentication failure
pub const NOT_AUTHORIZED: &str = "Not authorized";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] notekeep_db::DbError),
}

impl AuthError {
    /// Short label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken | AuthError::Jwt(_) => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::MissingAuthHeader => "missing_header",
            AuthError::InvalidAuthHeader => "invalid_header",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InvalidLifetime(_) => "invalid_lifetime",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::Database(_) => "database",
        }
    }

    /// Whether this is a server-side failure rather than a rejected credential
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::PasswordHash(_) | AuthError::InvalidLifetime(_) | AuthError::Database(_)
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Clients never learn which check failed
        let (status, message) = if self.is_internal() {
            error!("Authentication internal error: {}", self);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        } else {
            (StatusCode::UNAUTHORIZED, NOT_AUTHORIZED)
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

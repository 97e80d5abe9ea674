//! Registration and login routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use notekeep_auth::{AuthError, hash_password, verify_password};
use notekeep_db::{DbError, NewUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AuthResponse, LoginRequest, RegisterRequest, non_blank};

const EMAIL_IN_USE: &str = "Email already in use";

// ==================== Input Validation ====================

/// Password must be present and non-empty; it is used as given, untrimmed
fn validate_password(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.is_empty())
}

// ==================== Auth Routes ====================

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;

    let (Some(name), Some(email), Some(password)) = (
        non_blank(request.name),
        non_blank(request.email),
        validate_password(request.password),
    ) else {
        return Err(ApiError::BadRequest(
            "Please provide name, email and password".to_string(),
        ));
    };

    debug!("Registration attempt for: {}", email);

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::BadRequest(EMAIL_IN_USE.to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user = state
        .db
        .insert_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::BadRequest(EMAIL_IN_USE.to_string()),
            e => ApiError::Database(e),
        })?;

    let token = state.jwt.generate_token(&user.id)?;

    metrics::counter!("notekeep_registrations_total").increment(1);
    info!("Registered user {} ({})", user.email, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;

    let (Some(email), Some(password)) = (
        non_blank(request.email),
        validate_password(request.password),
    ) else {
        return Err(ApiError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    };

    debug!("Login attempt for: {}", email);

    let user = match state.db.get_user_by_email(&email).await? {
        Some(user) if verify_password(&password, &user.password_hash)? => user,
        found => {
            // Spend the same hashing work when the email is unknown
            if found.is_none() {
                hash_password(&password)?;
            }
            metrics::counter!("notekeep_logins_total", "result" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.jwt.generate_token(&user.id)?;

    metrics::counter!("notekeep_logins_total", "result" => "success").increment(1);
    info!("User {} logged in successfully", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{TestApp, register_user};

    #[tokio::test]
    async fn test_register_returns_token_for_new_user() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "Ada", "email": "ada@example.com", "password": "pw123456"})),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["name"], "Ada");
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("password_hash").is_none());

        let claims = app.state.jwt.validate_token(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.sub, body["user"]["id"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let app = TestApp::new().await;
        register_user(&app, "Ada", "ada@example.com", "pw123456").await;

        let user = app.state.db.get_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "pw123456");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let app = TestApp::new().await;

        for body in [
            json!({"email": "ada@example.com", "password": "pw"}),
            json!({"name": "Ada", "password": "pw"}),
            json!({"name": "Ada", "email": "ada@example.com"}),
            json!({"name": "  ", "email": "ada@example.com", "password": "pw"}),
        ] {
            let (status, resp) = app.send(Method::POST, "/api/auth/register", None, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(resp["message"], "Please provide name, email and password");
        }
    }

    #[tokio::test]
    async fn test_long_password_registers_and_logs_in() {
        let app = TestApp::new().await;
        let password = "p".repeat(300);

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "Ada", "email": "ada@example.com", "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "ada@example.com", "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let app = TestApp::new().await;
        register_user(&app, "Ada", "ada@example.com", "pw123456").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"name": "Other", "email": "ada@example.com", "password": "x"})),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already in use");
    }

    #[tokio::test]
    async fn test_login_success() {
        let app = TestApp::new().await;
        let (_, user_id) = register_user(&app, "Ada", "ada@example.com", "pw123456").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "ada@example.com", "password": "pw123456"})),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id);
        let claims = app.state.jwt.validate_token(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = TestApp::new().await;
        register_user(&app, "Ada", "ada@example.com", "pw123456").await;

        let (wrong_pw_status, wrong_pw) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "ada@example.com", "password": "nope"})),
            )
            .await;
        let (unknown_status, unknown) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "ghost@example.com", "password": "pw123456"})),
            )
            .await;

        assert_eq!(wrong_pw_status, StatusCode::BAD_REQUEST);
        assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_pw, unknown);
        assert_eq!(wrong_pw["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(Method::POST, "/api/auth/login", None, Some(json!({"email": "a@b.c"})))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please provide email and password");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = TestApp::new().await;

        let (status, body) = app.send_raw(Method::POST, "/api/auth/login", None, "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }
}

//! Authentication middleware for Axum

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use notekeep_db::{Database, UserProfile};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::JwtManager;

/// Authenticated user, attached to request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserProfile);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

/// Everything the middleware needs to turn a bearer token into a user
#[derive(Clone)]
pub struct Authenticator {
    pub jwt: Arc<JwtManager>,
    pub db: Database,
}

impl Authenticator {
    pub fn new(jwt: Arc<JwtManager>, db: Database) -> Self {
        Self { jwt, db }
    }

    /// Resolve an `Authorization` header value to the user it names
    ///
    /// Header and token checks run before the store is touched.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<UserProfile, AuthError> {
        let header = header.ok_or(AuthError::MissingAuthHeader)?;
        let token = extract_bearer_token(header)?;
        let claims = self.jwt.validate_token(token)?;

        // Token may outlive the account it was issued for
        self.db
            .get_user_profile(&claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware
///
/// Extracts and validates the JWT from the Authorization header and loads the
/// user it names. On success the [`CurrentUser`] is added to request
/// extensions; otherwise the request is answered with 401 and never reaches
/// the handler.
pub async fn auth_middleware(
    State(auth): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let user = match auth.authenticate(header).await {
        Ok(user) => user,
        Err(e) => {
            debug!("Rejected request to {}: {}", request.uri().path(), e);
            metrics::counter!("notekeep_auth_failures_total", "reason" => e.reason()).increment(1);
            return Err(e);
        }
    };

    debug!("Authenticated user: {} ({})", user.email, user.id);

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::Duration;
    use notekeep_db::NewUser;
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
        user.0.email
    }

    async fn setup() -> (Router, Authenticator, String) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user = db
            .insert_user(NewUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let auth = Authenticator::new(
            Arc::new(JwtManager::new("test-secret", Duration::days(7))),
            db,
        );
        let app = Router::new()
            .route("/me", get(whoami))
            .layer(from_fn_with_state(auth.clone(), auth_middleware));
        (app, auth, user.id)
    }

    fn request(auth_header: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/me");
        if let Some(value) = auth_header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(
            extract_bearer_token("Basic abc"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_bearer_token("Bearer "),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (app, auth, user_id) = setup().await;
        let token = auth.jwt.generate_token(&user_id).unwrap();

        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_and_garbled_headers_rejected() {
        let (app, _, _) = setup().await;

        for header in [None, Some("Token abc"), Some("Bearer not.a.jwt")] {
            let response = app.clone().oneshot(request(header)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_rejects_before_touching_store() {
        let (app, auth, _) = setup().await;
        // Any store access would now fail with a 500
        auth.db.pool().close().await;

        let response = app.oneshot(request(Some("Bearer garbage"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let (app, auth, user_id) = setup().await;
        let token = auth.jwt.generate_token(&user_id).unwrap();
        auth.db.delete_user(&user_id).await.unwrap();

        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

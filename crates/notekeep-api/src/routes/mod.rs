//! API routes

mod auth;
mod health;
pub mod metrics;
mod notes;
pub mod types;

use axum::{Router, middleware::from_fn_with_state};
use notekeep_auth::auth_middleware;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Fallback for paths no route matches
async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    // Only matched note routes pass through authentication
    let notes = notes::routes().route_layer(from_fn_with_state(
        state.authenticator(),
        auth_middleware,
    ));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(notes)
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.fallback(route_not_found)
}

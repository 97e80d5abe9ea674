//! Notekeep REST API
//!
//! This crate provides the Axum-based HTTP API: account registration and
//! login, and owner-scoped CRUD and search over notes.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

#[cfg(test)]
pub(crate) mod test_support;

//! Application state

use notekeep_auth::{Authenticator, JwtManager};
use notekeep_db::Database;
use std::sync::Arc;

/// Prometheus exporter handle used by the `/metrics` route
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// Optional upper bound for the `limit` query parameter when listing notes
    pub max_page_size: Option<i64>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>, max_page_size: Option<i64>) -> Self {
        Self {
            db,
            jwt,
            max_page_size,
        }
    }

    /// State for the authentication middleware
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.jwt.clone(), self.db.clone())
    }
}

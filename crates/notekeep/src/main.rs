//! Notekeep - notes API with token authentication

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig, Overrides};
use notekeep_api::{AppState, create_router};
use notekeep_auth::JwtManager;
use notekeep_db::Database;

/// Notekeep - notes API with token authentication
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "NOTEKEEP_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Secret used to sign tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token lifetime, e.g. "7d"
    #[arg(long, env = "JWT_EXPIRES_IN")]
    jwt_expires_in: Option<String>,

    /// Development mode: allow running without a JWT secret
    #[arg(long, env = "NOTEKEEP_DEV")]
    dev: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            port: self.port,
            database_url: self.database_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expires_in: self.jwt_expires_in.clone(),
            dev_mode: self.dev,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env feed the env fallbacks below
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let loaded = Config::load(&args.config)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    config.apply_overrides(args.overrides());

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Notekeep v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {}", args.config);
    } else {
        info!("Config file not found at {}, using defaults", args.config);
    }

    let jwt_secret = config.auth.signing_secret()?;
    if config.auth.uses_dev_secret() {
        warn!("Dev mode: signing tokens with the built-in development secret");
    }

    // Create data directory for file-backed databases
    if let Some(db_path) = config.database.file_path()
        && let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }

    // Initialize database; an unreachable store is fatal
    let db = Database::new(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::from_config(
        jwt_secret,
        &config.auth.jwt_expires_in,
    )?);
    info!("Issued tokens expire after {}", config.auth.jwt_expires_in);

    // Initialize metrics
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create application state
    let state = AppState::new(db, jwt, config.notes.max_page_size);

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Quire Server - Journal REST API
//!
//! HTTP server exposing the submission lifecycle, issue listing, and
//! activity log over a uniform JSON envelope.

pub mod auth;
pub mod http;

use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quire_core::{Notifier, NullNotifier, QuireConfig, Repository, Result, SmtpNotifier};

/// Shared application state
pub struct AppState {
    pub repository: Mutex<Repository>,
    pub config: QuireConfig,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create application state from configuration, opening the database
    /// at the configured path and wiring the SMTP notifier if configured.
    pub fn new(config: QuireConfig) -> Result<Self> {
        let repository = Repository::new(&config.server.db_path)?;

        let notifier: Arc<dyn Notifier> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
            None => {
                tracing::info!("no SMTP configured, status notifications will be dropped");
                Arc::new(NullNotifier)
            }
        };

        Ok(Self {
            repository: Mutex::new(repository),
            config,
            notifier,
        })
    }

    /// Create state backed by an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            repository: Mutex::new(Repository::in_memory()?),
            config: QuireConfig::default(),
            notifier: Arc::new(NullNotifier),
        })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Submission endpoints
        .route("/submissions", get(http::list_submissions))
        .route("/submissions", post(http::create_submission))
        .route("/submissions/{id}", get(http::get_submission))
        .route("/submissions/{id}/status", patch(http::update_status))
        .route("/submissions/{id}/activity", get(http::get_activity))
        // Issue endpoints
        .route("/issues", get(http::list_issues))
        // System endpoints
        .route("/status", get(http::get_status))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Quire server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

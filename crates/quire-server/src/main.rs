//! Quire server binary

use std::sync::Arc;

use quire_core::QuireConfig;
use quire_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quire_server=info,quire_core=info,tower_http=info".into()),
        )
        .init();

    let config_path =
        std::env::var("QUIRE_CONFIG").unwrap_or_else(|_| "quire.toml".to_string());
    let mut config = QuireConfig::load_or_default(&config_path);

    if let Ok(addr) = std::env::var("QUIRE_ADDR") {
        config.server.bind_addr = addr;
    }

    let addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    serve(&addr, state).await
}

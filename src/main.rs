//! stockroom server entry point.
//!
//! Starts the Axum HTTP server over the configured catalog store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use stockroom::api;
use stockroom::app_state::AppState;
use stockroom::auth::{IdentityGate, SessionGate};
use stockroom::config::{CatalogConfig, LogFormat};
use stockroom::store::{CatalogStore, MemoryStore, PostgresStore};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = CatalogConfig::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting stockroom");

    // Build persistence layer
    let store: Arc<dyn CatalogStore> = if config.persistence_enabled {
        let pg = PostgresStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        pg.migrate().await.context("applying migrations")?;
        tracing::info!("using PostgreSQL catalog store");
        Arc::new(pg)
    } else {
        tracing::warn!("persistence disabled; catalog lives in memory only");
        Arc::new(MemoryStore::new())
    };

    // Build identity gate
    if config.bootstrap_users.is_empty() {
        tracing::warn!("BOOTSTRAP_USERS is empty; nobody can log in");
    }
    let identity: Arc<dyn IdentityGate> = Arc::new(
        SessionGate::with_users(
            &config.bootstrap_users,
            config.session_ttl(),
        )
        .context("provisioning users")?,
    );

    // Build application state and router
    let state = AppState::new(
        store,
        identity,
        config.low_stock_threshold,
        Duration::from_secs(config.request_timeout_secs),
    );
    let app = api::build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}

//! routefinder HTTP service.
//!
//! Loads the road graph named by `ROUTEFINDER_SOURCE` once, then serves
//! route queries. See [`routefinder_service::config`] for the environment
//! variables it reads.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info};

use routefinder_service::{build_router, init_logging, AppState, LoggingConfig, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env().with_service("routefinder");
    init_logging(&logging_config);

    let config = ServiceConfig::from_env().map_err(|err| {
        error!(error = %err, "invalid service configuration");
        err
    })?;
    info!(
        source = %config.source.display(),
        port = config.port,
        query_timeout_ms = config.query_timeout.as_millis() as u64,
        "starting routefinder service"
    );

    let state = AppState::load(&config).map_err(|err| {
        error!(error = %err, path = %config.source.display(), "failed to load application state");
        err
    })?;

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

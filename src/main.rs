//! Gastrak Server
//!
//! Main entry point for the fuel price service.
//! This service provides:
//! - HTTP API over the current and history data sets
//! - Background refresh of both data sets on a fixed interval

use gastrak::config::AppConfig;
use gastrak::error::{AppError, AppResult};
use gastrak::http::{self, AppState};
use gastrak::refresher::Refresher;
use gastrak::source;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gastrak={},sqlx=warn,tower_http=info", config.log_level).into()
            }),
        )
        .init();

    info!("Gastrak server starting");
    info!("Current data: {}", config.current_path.display());
    match &config.history_path {
        Some(path) => info!("History data: {}", path.display()),
        None => warn!("No history source configured - /history will be unavailable"),
    }
    info!("Refresh interval: {:?}", config.refresh_interval());

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        return Err(e.into());
    }

    info!("Gastrak server shutdown complete");
    Ok(())
}

async fn run(config: AppConfig) -> AppResult<()> {
    // =========================================================================
    // SOURCES + STARTUP LOAD
    // =========================================================================
    let current = source::source_for_path(&config.current_path, &config.database).await?;
    let history = match &config.history_path {
        Some(path) => Some(source::source_for_path(path, &config.database).await?),
        None => None,
    };

    // A failed first load is fatal: nothing is served from a stale or empty cache
    let refresher = Refresher::initialize(current, history.clone())
        .await?
        .with_refresh_interval(config.refresh_interval());
    let publisher = refresher.publisher();
    info!("✓ Initial snapshot loaded");

    // =========================================================================
    // BACKGROUND REFRESH
    // =========================================================================
    let mut refresh_handle = refresher.spawn();
    info!("✓ Refresher background task started");

    // =========================================================================
    // HTTP SERVER
    // =========================================================================
    let state = AppState::new(
        publisher,
        config.latitude,
        config.longitude,
        history.is_some(),
    );
    let app = http::router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server to {}: {}", addr, e)))?;
    info!("✓ HTTP server listening on {}", addr);

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = refresh_handle.join() => {
            error!("Refresher task exited unexpectedly");
        }
    }

    refresh_handle.stop().await;
    Ok(())
}

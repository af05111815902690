//! HTTP API over the published snapshot.
//!
//! Handlers read the snapshot once per request and hand it to the query
//! engine and encoders; they never touch the publisher's lock beyond that.

pub mod handlers;

use crate::publisher::SnapshotPublisher;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<SnapshotPublisher>,
    pub latitude: f64,
    pub longitude: f64,
    pub history_enabled: bool,
}

impl AppState {
    pub fn new(publisher: Arc<SnapshotPublisher>, latitude: f64, longitude: f64, history_enabled: bool) -> Self {
        Self {
            publisher,
            latitude,
            longitude,
            history_enabled,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/current", get(handlers::current))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

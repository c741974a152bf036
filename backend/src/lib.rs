//! Post-Harvest Risk Platform - Backend
//!
//! Offline-first batch storage and spoilage-risk monitoring for farmers
//! storing harvested crops.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;

use services::{AdvisoryService, BatchStore, ForecastFeed, NetworkMonitor, SyncCoordinator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub batches: Arc<BatchStore>,
    pub coordinator: Arc<SyncCoordinator>,
    pub network: Arc<NetworkMonitor>,
    pub forecast: Arc<ForecastFeed>,
    pub advisory: AdvisoryService,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Post-Harvest Risk Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

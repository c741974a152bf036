//! Route definitions for the Post-Harvest Risk Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/batches", batch_routes())
        .route("/risk", post(handlers::compute_batch_risk))
        .route("/advisory", post(handlers::get_advisory))
        .nest("/sync", sync_routes())
        .nest("/forecast", forecast_routes())
}

/// Batch lifecycle routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::save_batch))
        .route("/risk", get(handlers::get_risk_board))
        .route("/:batch_id/complete", post(handlers::complete_batch))
        .route("/:batch_id/processing", post(handlers::start_processing))
}

/// Offline sync routes
fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::sync_now))
        .route("/status", get(handlers::get_status))
        .route("/connectivity", put(handlers::set_connectivity))
}

/// Forecast routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_forecast).put(handlers::publish_forecast))
        .route("/readings", put(handlers::publish_readings))
}

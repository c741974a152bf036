//! Sync handlers for offline support

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::{DrainReport, SyncStatus};
use crate::AppState;

#[derive(Deserialize)]
pub struct ConnectivityRequest {
    pub online: bool,
}

#[derive(Serialize)]
pub struct ConnectivityResponse {
    pub online: bool,
    pub changed: bool,
}

/// Current connectivity, drain state and queue depth
pub async fn get_status(State(state): State<AppState>) -> AppResult<Json<SyncStatus>> {
    Ok(Json(state.coordinator.status().await?))
}

/// Drain the offline queue now
pub async fn sync_now(State(state): State<AppState>) -> AppResult<Json<DrainReport>> {
    Ok(Json(state.coordinator.sync_now().await?))
}

/// Platform network signal
pub async fn set_connectivity(
    State(state): State<AppState>,
    Json(body): Json<ConnectivityRequest>,
) -> Json<ConnectivityResponse> {
    let changed = state.network.set_online(body.online).await;
    Json(ConnectivityResponse {
        online: body.online,
        changed,
    })
}

//! Batch HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use shared::{risk_board, BatchDraft, BatchRisk};
use uuid::Uuid;

use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBoardResponse {
    pub forecast_available: bool,
    pub risks: Vec<BatchRisk>,
}

/// List the owner's batches, newest first, including unsynced ones
pub async fn list_batches(State(state): State<AppState>) -> impl IntoResponse {
    let batches = state.batches.current();
    (StatusCode::OK, Json(serde_json::json!({ "batches": batches })))
}

/// Save a new batch, online or into the offline queue
pub async fn save_batch(
    State(state): State<AppState>,
    Json(draft): Json<BatchDraft>,
) -> impl IntoResponse {
    match state.coordinator.save_batch(draft).await {
        Ok(outcome) if outcome.success => (StatusCode::CREATED, Json(outcome)).into_response(),
        Ok(outcome) => (StatusCode::SERVICE_UNAVAILABLE, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark a batch as completed
pub async fn complete_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.batches.complete_batch(batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Move a batch into processing
pub async fn start_processing(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.batches.start_processing(batch_id).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Risk board for every monitored batch under the latest forecast
pub async fn get_risk_board(State(state): State<AppState>) -> AppResult<Json<RiskBoardResponse>> {
    let forecast = state.forecast.latest();
    let risks = risk_board(&state.batches.current(), forecast.as_ref());

    Ok(Json(RiskBoardResponse {
        forecast_available: forecast.is_some(),
        risks,
    }))
}

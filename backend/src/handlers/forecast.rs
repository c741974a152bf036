//! Forecast handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use shared::{HourlyReading, WeatherForecast};

use crate::error::AppResult;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsRequest {
    /// Local offset used to group readings into days
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    pub readings: Vec<HourlyReading>,
}

// Bangladesh Standard Time
fn default_utc_offset() -> i32 {
    360
}

/// Latest published forecast
pub async fn get_forecast(State(state): State<AppState>) -> impl IntoResponse {
    match state.forecast.latest() {
        Some(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Publish a normalized forecast
pub async fn publish_forecast(
    State(state): State<AppState>,
    Json(forecast): Json<WeatherForecast>,
) -> StatusCode {
    state.forecast.publish(forecast);
    StatusCode::NO_CONTENT
}

/// Summarize raw provider readings and publish them
pub async fn publish_readings(
    State(state): State<AppState>,
    Json(body): Json<ReadingsRequest>,
) -> AppResult<Json<WeatherForecast>> {
    let forecast = state
        .forecast
        .publish_readings(&body.readings, body.utc_offset_minutes)?;
    Ok(Json(forecast))
}

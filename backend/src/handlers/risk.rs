//! Risk and advisory handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use shared::{compute_risk, AdvisoryRule, BatchDraft, Language, RiskLevel, RiskResult, WeatherForecast};

use crate::error::AppResult;
use crate::AppState;

#[derive(Deserialize)]
pub struct ComputeRiskRequest {
    pub batch: BatchDraft,
    /// Falls back to the latest published forecast
    pub forecast: Option<WeatherForecast>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub crop: String,
    pub risk_level: RiskLevel,
    pub forecast: Option<WeatherForecast>,
    #[serde(default)]
    pub lang: Language,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryResponse {
    pub rule: AdvisoryRule,
    pub message: String,
    pub message_en: String,
    pub message_bn: String,
}

/// Compute the risk of an ad-hoc batch
pub async fn compute_batch_risk(
    State(state): State<AppState>,
    Json(body): Json<ComputeRiskRequest>,
) -> AppResult<Json<RiskResult>> {
    let forecast = body.forecast.or_else(|| state.forecast.latest());
    Ok(Json(compute_risk(&body.batch, forecast.as_ref())))
}

/// Generate an advisory; warnings are also sent by SMS
pub async fn get_advisory(
    State(state): State<AppState>,
    Json(body): Json<AdvisoryRequest>,
) -> AppResult<Json<AdvisoryResponse>> {
    let forecast = body.forecast.or_else(|| state.forecast.latest());
    let advisory = state
        .advisory
        .advise(&body.crop, forecast.as_ref(), body.risk_level);

    Ok(Json(AdvisoryResponse {
        rule: advisory.rule,
        message: advisory.message(body.lang).to_string(),
        message_en: advisory.message(Language::English).to_string(),
        message_bn: advisory.message(Language::Bangla).to_string(),
    }))
}

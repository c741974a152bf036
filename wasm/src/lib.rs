//! WebAssembly module for the Post-Harvest Risk Platform
//!
//! Provides client-side computation so a farmer's browser can keep scoring
//! batches while offline:
//! - Spoilage risk (ETCL, tier, advice)
//! - Localized advisories
//! - Crop profile lookup
//! - Draft validation before queueing

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn parse_forecast(forecast_json: &str) -> Result<Option<WeatherForecast>, JsValue> {
    if forecast_json.trim().is_empty() || forecast_json.trim() == "null" {
        return Ok(None);
    }
    serde_json::from_str(forecast_json)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("Invalid forecast JSON: {}", e)))
}

/// Compute the spoilage risk of a batch (or draft) against a forecast.
/// Pass an empty string or "null" when no forecast is available.
#[wasm_bindgen]
pub fn compute_batch_risk(batch_json: &str, forecast_json: &str) -> Result<String, JsValue> {
    let draft: BatchDraft = serde_json::from_str(batch_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid batch JSON: {}", e)))?;
    let forecast = parse_forecast(forecast_json)?;

    let result = shared::compute_risk(&draft, forecast.as_ref());
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Advisory text for a crop in the requested language ("bn" or "en")
#[wasm_bindgen]
pub fn generate_advisory_text(
    crop: &str,
    forecast_json: &str,
    risk_level: &str,
    lang: &str,
) -> Result<String, JsValue> {
    let forecast = parse_forecast(forecast_json)?;
    let level = RiskLevel::parse(risk_level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown risk level: {}", risk_level)))?;

    let advisory = shared::generate_advisory(crop, forecast.as_ref(), level);
    Ok(advisory.message(Language::from_code(lang)).to_string())
}

/// Crop profile for a free-form crop name, as JSON
#[wasm_bindgen]
pub fn crop_profile_json(crop: &str) -> String {
    serde_json::to_string(&profile_for(crop)).unwrap_or_default()
}

/// Whether a draft would be accepted by the save path
#[wasm_bindgen]
pub fn validate_batch_draft_json(draft_json: &str, today: &str) -> bool {
    let Ok(draft) = serde_json::from_str::<BatchDraft>(draft_json) else {
        return false;
    };
    let Ok(today) = today.parse() else {
        return false;
    };
    validate_batch_draft(&draft, today).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHEAT_DRAFT: &str = r#"{
        "cropType": "Wheat",
        "weightKg": 300,
        "harvestDate": "2024-04-01",
        "storageLocation": "Thakurgaon",
        "storageType": "Silo",
        "moistureContent": 10
    }"#;

    const DRY_FORECAST: &str = r#"{
        "current": {"temp": 22, "humidity": 55, "weather": "Clear"},
        "forecast": [
            {"date": "2024-04-02", "temp": 23, "rainProb": 10, "humidity": 50, "weather": "Clear"},
            {"date": "2024-04-03", "temp": 24, "rainProb": 20, "humidity": 50, "weather": "Clouds"}
        ]
    }"#;

    #[test]
    fn test_compute_batch_risk() {
        let json = compute_batch_risk(WHEAT_DRAFT, DRY_FORECAST).unwrap();
        let result: RiskResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert_eq!(result.etcl_hours, rust_decimal::Decimal::from(144));
    }

    #[test]
    fn test_advisory_text_languages() {
        let en = generate_advisory_text("Rice", DRY_FORECAST, "critical", "en").unwrap();
        assert_eq!(en, "Urgent warning! Your crop is at risk. Consult an expert.");

        let bn = generate_advisory_text("Rice", "", "SAFE", "bn").unwrap();
        assert!(bn.starts_with("আবহাওয়া"));
    }

    #[test]
    fn test_crop_profile_json() {
        let json = crop_profile_json("potato");
        assert!(json.contains("\"potato\""));
        assert!(json.contains("\"heat_sensitive\":true"));
    }

    #[test]
    fn test_validate_draft() {
        assert!(validate_batch_draft_json(WHEAT_DRAFT, "2024-04-05"));
        assert!(!validate_batch_draft_json(WHEAT_DRAFT, "2024-03-01"));
        assert!(!validate_batch_draft_json("{}", "2024-04-05"));
    }
}

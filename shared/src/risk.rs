//! Spoilage risk computation
//!
//! Estimates the time to critical loss (ETCL) of a batch from its crop
//! profile, moisture, storage and the weather forecast, then classifies the
//! estimate into a risk tier with a templated advisory. Every function here is
//! pure: identical inputs always produce identical results.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    profile_for, Batch, BatchDraft, BatchRisk, CropProfile, RiskLevel, RiskResult, WeatherForecast,
};

pub const FACTOR_HIGH_MOISTURE: &str = "High Moisture";
pub const FACTOR_HIGH_TEMP: &str = "High Ambient Temp";
pub const FACTOR_RAIN_BLOCKING_DRYING: &str = "Rain Blocking Drying";

/// Ambient temperature assumed when no forecast is available
pub const DEFAULT_AMBIENT_TEMP: i64 = 30;

/// Rain probability (percent) above which open-air drying is considered blocked
pub const DRYING_BLOCK_RAIN_PROB: i32 = 50;

/// Temperature (°C) above which heat stress dominates the advice
const HEAT_STRESS_TEMP: i64 = 35;

/// The batch attributes the engine reads
#[derive(Debug, Clone, Copy)]
pub struct BatchAttributes<'a> {
    pub crop_type: &'a str,
    pub storage_type: &'a str,
    pub moisture_content: Option<Decimal>,
}

impl<'a> From<&'a Batch> for BatchAttributes<'a> {
    fn from(batch: &'a Batch) -> Self {
        Self {
            crop_type: &batch.crop_type,
            storage_type: &batch.storage_type,
            moisture_content: batch.moisture_content,
        }
    }
}

impl<'a> From<&'a BatchDraft> for BatchAttributes<'a> {
    fn from(draft: &'a BatchDraft) -> Self {
        Self {
            crop_type: &draft.crop_type,
            storage_type: &draft.storage_type,
            moisture_content: draft.moisture_content,
        }
    }
}

/// Whether a storage description denotes sealed or climate-controlled storage
pub fn is_protected_storage(storage_type: &str) -> bool {
    let storage = storage_type.to_lowercase();
    ["silo", "drum", "sealed", "cold"]
        .iter()
        .any(|kind| storage.contains(kind))
}

/// Hours added by the storage method
pub fn storage_bonus(storage_type: &str, profile: &CropProfile) -> Decimal {
    if !is_protected_storage(storage_type) {
        return Decimal::ZERO;
    }

    let mut bonus = Decimal::from(48);
    if profile.heat_sensitive && storage_type.to_lowercase().contains("cold") {
        bonus += Decimal::from(72);
    }
    bonus
}

/// Compute the spoilage risk of a batch.
///
/// A missing forecast, or a forecast with fewer days than the scan window,
/// is treated as dry weather for the missing days.
pub fn compute_risk<'a>(
    batch: impl Into<BatchAttributes<'a>>,
    forecast: Option<&WeatherForecast>,
) -> RiskResult {
    let batch = batch.into();
    let profile = profile_for(batch.crop_type);
    let mut etcl_hours = profile.baseline_hours;
    let mut risk_factors = Vec::new();

    let moisture = batch
        .moisture_content
        .unwrap_or_else(|| profile.default_moisture());
    let wet = moisture > profile.moisture_threshold;
    if wet {
        etcl_hours -= (moisture - profile.moisture_threshold) * profile.moisture_penalty_rate();
        risk_factors.push(FACTOR_HIGH_MOISTURE.to_string());
    }

    let current_temp = forecast
        .and_then(|f| f.current.temp)
        .unwrap_or_else(|| Decimal::from(DEFAULT_AMBIENT_TEMP));
    if current_temp > profile.heat_threshold {
        etcl_hours -= profile.heat_penalty();
        risk_factors.push(FACTOR_HIGH_TEMP.to_string());
    }

    etcl_hours += storage_bonus(batch.storage_type, &profile);
    etcl_hours = etcl_hours.max(Decimal::ZERO);

    // Hours before the rainy day are unaffected; the hours remaining after it
    // are halved. On a rainy tomorrow this halves the whole estimate.
    let rain_day = forecast.and_then(|f| first_drying_block_day(f, etcl_hours));
    if let Some(day) = rain_day {
        let dry_hours = Decimal::from(24 * day as i64);
        etcl_hours = dry_hours + (etcl_hours - dry_hours) / Decimal::from(2);
        risk_factors.push(FACTOR_RAIN_BLOCKING_DRYING.to_string());
    }

    let mut risk_level = RiskLevel::from_etcl_hours(etcl_hours);
    if rain_day.is_some() && risk_level < RiskLevel::High {
        risk_level = RiskLevel::High;
    }

    let advice = compose_advice(&AdviceContext {
        profile: &profile,
        risk_level,
        etcl_hours,
        moisture,
        wet,
        current_temp,
        rain_day,
    });

    RiskResult {
        risk_level,
        etcl_hours,
        color: risk_level.color().to_string(),
        advice,
        risk_factors,
    }
}

/// Index of the first forecast day inside the ETCL window whose rain
/// probability blocks drying. Only the first such day counts.
fn first_drying_block_day(forecast: &WeatherForecast, etcl_hours: Decimal) -> Option<usize> {
    let window = (etcl_hours / Decimal::from(24))
        .ceil()
        .to_usize()
        .unwrap_or(0)
        .min(forecast.forecast.len());

    forecast
        .forecast
        .iter()
        .take(window)
        .position(|day| day.rain_prob > DRYING_BLOCK_RAIN_PROB)
}

struct AdviceContext<'a> {
    profile: &'a CropProfile,
    risk_level: RiskLevel,
    etcl_hours: Decimal,
    moisture: Decimal,
    wet: bool,
    current_temp: Decimal,
    rain_day: Option<usize>,
}

fn compose_advice(ctx: &AdviceContext<'_>) -> String {
    let tuber = ctx.profile.crop.is_tuber();
    let hours = ctx.etcl_hours.round_dp(1).normalize();

    if let Some(day) = ctx.rain_day {
        let when = if day == 0 {
            "tomorrow".to_string()
        } else {
            format!("in {} days", day + 1)
        };
        return if tuber {
            format!(
                "Rot Risk. Rain predicted {}. Keep dry and cool to prevent soft rot. (ETCL: {} hours)",
                when, hours
            )
        } else {
            format!(
                "Mold Risk. Rain predicted {}. Outdoor drying impossible. Aerate immediately. (ETCL: {} hours)",
                when, hours
            )
        };
    }

    if ctx.current_temp > Decimal::from(HEAT_STRESS_TEMP) {
        return if tuber {
            format!(
                "Heat Stress. {} degrading rapidly. Move to cold storage or a shaded area.",
                ctx.profile.crop
            )
        } else {
            "Heat Stress. Grain temperature is high. Turn the stack to release heat.".to_string()
        };
    }

    match ctx.risk_level {
        RiskLevel::Critical | RiskLevel::High => {
            let tier = if ctx.risk_level == RiskLevel::Critical {
                "Critical"
            } else {
                "High"
            };
            if ctx.wet && tuber {
                format!(
                    "{} Risk (ETCL: {} hours). Moisture is high ({}%). Remove damaged tubers and ventilate to stop rot.",
                    tier,
                    hours,
                    ctx.moisture.normalize()
                )
            } else if ctx.wet {
                format!(
                    "{} Risk (ETCL: {} hours). Moisture is critically high ({}%). Dry immediately to stop mold.",
                    tier,
                    hours,
                    ctx.moisture.normalize()
                )
            } else {
                format!(
                    "{} Risk (ETCL: {} hours). Conditions are degrading rapidly.",
                    tier, hours
                )
            }
        }
        RiskLevel::Medium => format!(
            "Moderate Risk. You have approximately {} hours. Check moisture daily.",
            hours
        ),
        RiskLevel::Low | RiskLevel::Safe => {
            "Stable. Conditions are favorable.".to_string()
        }
    }
}

/// Risk results for every batch that is still monitored
pub fn risk_board(batches: &[Batch], forecast: Option<&WeatherForecast>) -> Vec<BatchRisk> {
    batches
        .iter()
        .filter(|b| b.is_monitored())
        .map(|b| BatchRisk {
            batch_id: b.id,
            crop_type: b.crop_type.clone(),
            risk: compute_risk(b, forecast),
        })
        .collect()
}

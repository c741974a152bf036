//! Spoilage risk models

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify an ETCL estimate.
    ///
    /// Boundaries: under 24h critical, under 48h high, under 72h medium,
    /// under 96h low, otherwise safe.
    pub fn from_etcl_hours(hours: Decimal) -> Self {
        if hours < Decimal::from(24) {
            RiskLevel::Critical
        } else if hours < Decimal::from(48) {
            RiskLevel::High
        } else if hours < Decimal::from(72) {
            RiskLevel::Medium
        } else if hours < Decimal::from(96) {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe | RiskLevel::Low => "green",
            RiskLevel::Medium => "yellow",
            RiskLevel::High => "orange",
            RiskLevel::Critical => "red",
        }
    }

    /// HIGH or CRITICAL
    pub fn is_severe(&self) -> bool {
        *self >= RiskLevel::High
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Parse a tier name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "SAFE" => Some(RiskLevel::Safe),
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            "CRITICAL" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a risk computation. Recomputed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    /// Estimated Time to Critical Loss, never negative
    pub etcl_hours: Decimal,
    pub color: String,
    pub advice: String,
    pub risk_factors: Vec<String>,
}

/// Risk result for one active batch on the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchRisk {
    pub batch_id: Uuid,
    pub crop_type: String,
    pub risk: RiskResult,
}

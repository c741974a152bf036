//! Crop- and weather-aware advisories
//!
//! An ordered decision table; the first matching rule wins. Messages are
//! carried in Bangla and English.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{weather_label_bn, CropKind, RiskLevel, WeatherForecast};
use crate::types::{to_bangla_digits, Language, LocalizedText};

/// Humidity (%) above which tuber stores need forced ventilation
const TUBER_HUMIDITY_LIMIT: i32 = 80;

/// Temperature (°C) above which paddy fields need extra water
const PADDY_HEAT_LIMIT: i64 = 35;

/// Temperature assumed when the forecast carries none
const DEFAULT_TEMP: i64 = 25;

/// The rule that produced an advisory
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryRule {
    StorageVentilation,
    BlightFungicide,
    Irrigation,
    Drainage,
    Waterlogging,
    GeneralCritical,
    GeneralHigh,
    GeneralMedium,
    Favorable,
}

impl AdvisoryRule {
    pub fn text(&self) -> LocalizedText {
        match self {
            AdvisoryRule::StorageVentilation => LocalizedText::new(
                "Rain is expected tomorrow and humidity in your potato store is high. Turn on the fans now.",
                "আগামীকাল বৃষ্টি হবে এবং আপনার আলুর গুদামে আর্দ্রতা বেশি। এখনই ফ্যান চালু করুন।",
            ),
            AdvisoryRule::BlightFungicide => LocalizedText::new(
                "Risk of potato blight. Spray fungicide quickly.",
                "আলুর ব্লাইট রোগের ঝুঁকি রয়েছে। দ্রুত ছত্রাকনাশক স্প্রে করুন।",
            ),
            AdvisoryRule::Irrigation => LocalizedText::new(
                "Temperature is very high. Make sure the paddy field has enough water.",
                "তাপমাত্রা অনেক বেশি, ধানের জমিতে পর্যাপ্ত পানি নিশ্চিত করুন।",
            ),
            AdvisoryRule::Drainage => LocalizedText::new(
                "Heavy rain is likely. Keep the field drainage clear.",
                "ভারী বৃষ্টির সম্ভাবনা। জমির ড্রেনেজ ব্যবস্থা ঠিক রাখুন।",
            ),
            AdvisoryRule::Waterlogging => LocalizedText::new(
                "Do not let water stand in the wheat field; it can reduce the yield.",
                "গম ক্ষেতে পানি জমতে দেবেন না, এতে ফলন কমতে পারে।",
            ),
            AdvisoryRule::GeneralCritical => LocalizedText::new(
                "Urgent warning! Your crop is at risk. Consult an expert.",
                "জরুরী সতর্কতা! আপনার ফসলের অবস্থা ঝুঁকিপূর্ণ। বিশেষজ্ঞের পরামর্শ নিন।",
            ),
            AdvisoryRule::GeneralHigh => LocalizedText::new(
                "Warning: the weather is unfavorable. Monitor regularly.",
                "সতর্কতা: আবহাওয়া অনুকূল নয়। নিয়মিত পর্যবেক্ষণ করুন।",
            ),
            AdvisoryRule::GeneralMedium => LocalizedText::new(
                "Crop condition is fair, but keep an eye on the weather.",
                "ফসলের অবস্থা মোটামুটি ভালো, তবে আবহাওয়ার দিকে খেয়াল রাখুন।",
            ),
            AdvisoryRule::Favorable => LocalizedText::new(
                "The weather is favorable. Continue regular care.",
                "আবহাওয়া অনুকূল আছে। নিয়মিত পরিচর্যা চালিয়ে যান।",
            ),
        }
    }
}

/// A localized advisory
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Advisory {
    pub rule: AdvisoryRule,
    pub text: LocalizedText,
}

impl Advisory {
    fn from_rule(rule: AdvisoryRule) -> Self {
        Self {
            rule,
            text: rule.text(),
        }
    }

    pub fn message(&self, language: Language) -> &'static str {
        self.text.get(language)
    }

    /// True for the catch-all favorable message. Every other advisory is a
    /// warning worth pushing to the farmer.
    pub fn is_default(&self) -> bool {
        self.rule == AdvisoryRule::Favorable
    }
}

/// Pick the advisory for a crop under the given weather and risk tier
pub fn generate_advisory(
    crop: &str,
    weather: Option<&WeatherForecast>,
    risk_level: RiskLevel,
) -> Advisory {
    let kind = CropKind::from_name(crop);
    let humidity = weather.and_then(|w| w.current.humidity).unwrap_or(0);
    let temp = weather
        .and_then(|w| w.current.temp)
        .unwrap_or_else(|| Decimal::from(DEFAULT_TEMP));
    let rain_tomorrow = weather.map(WeatherForecast::rain_tomorrow).unwrap_or(false);
    let severe = risk_level.is_severe();

    let rule = match kind {
        Some(k) if k.is_tuber() && humidity > TUBER_HUMIDITY_LIMIT && rain_tomorrow => {
            Some(AdvisoryRule::StorageVentilation)
        }
        Some(k) if k.is_tuber() && severe => Some(AdvisoryRule::BlightFungicide),
        Some(CropKind::Rice) if temp > Decimal::from(PADDY_HEAT_LIMIT) => {
            Some(AdvisoryRule::Irrigation)
        }
        Some(CropKind::Rice) if rain_tomorrow && risk_level == RiskLevel::High => {
            Some(AdvisoryRule::Drainage)
        }
        Some(CropKind::Wheat) if rain_tomorrow => Some(AdvisoryRule::Waterlogging),
        _ => None,
    };

    let rule = rule.unwrap_or(match risk_level {
        RiskLevel::Critical => AdvisoryRule::GeneralCritical,
        RiskLevel::High => AdvisoryRule::GeneralHigh,
        RiskLevel::Medium => AdvisoryRule::GeneralMedium,
        RiskLevel::Low | RiskLevel::Safe => AdvisoryRule::Favorable,
    });

    Advisory::from_rule(rule)
}

/// Text of an advisory alert: crop name, the advice and the current weather,
/// e.g. "আলু: ... (২৮°সে, মেঘলা)"
pub fn alert_text(
    crop: &str,
    weather: Option<&WeatherForecast>,
    advisory: &Advisory,
    language: Language,
) -> String {
    let crop_name = match (language, CropKind::from_name(crop)) {
        (Language::Bangla, Some(kind)) => kind.name_bn(),
        _ => crop.trim(),
    };

    let current = weather.map(|w| &w.current);
    let temp = current.and_then(|c| c.temp).map(|t| t.round().to_string());
    let condition = current.and_then(|c| c.weather.as_deref());
    let conditions: Vec<String> = match language {
        Language::Bangla => temp
            .map(|t| format!("{}°সে", to_bangla_digits(&t)))
            .into_iter()
            .chain(condition.map(|c| weather_label_bn(c).to_string()))
            .collect(),
        Language::English => temp
            .map(|t| format!("{}°C", t))
            .into_iter()
            .chain(condition.map(str::to_string))
            .collect(),
    };

    let message = advisory.message(language);
    if conditions.is_empty() {
        format!("{}: {}", crop_name, message)
    } else {
        format!("{}: {} ({})", crop_name, message, conditions.join(", "))
    }
}

//! Weather forecast models
//!
//! The forecast is produced by an external fetch collaborator and consumed
//! here in normalized form. Every field that a provider may omit is optional;
//! consumers treat missing data as "unknown, assume safe".

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days kept when summarizing raw provider readings
pub const MAX_SUMMARY_DAYS: usize = 5;

/// Conditions right now at the storage location
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    #[serde(default)]
    pub temp: Option<Decimal>,
    #[serde(default)]
    pub humidity: Option<i32>,
    #[serde(default)]
    pub weather: Option<String>,
}

/// One day of forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp: Decimal,
    /// Probability of precipitation, 0-100
    #[serde(default)]
    pub rain_prob: i32,
    #[serde(default)]
    pub humidity: i32,
    #[serde(default)]
    pub weather: String,
}

impl DailyForecast {
    /// Whether the dominant condition is wet
    pub fn is_rainy(&self) -> bool {
        is_rain_condition(&self.weather)
    }
}

/// Multi-day forecast, days in ascending order starting tomorrow
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Vec<DailyForecast>,
}

impl WeatherForecast {
    /// Tomorrow's forecast if the provider supplied one
    pub fn tomorrow(&self) -> Option<&DailyForecast> {
        self.forecast.first()
    }

    /// Rain or drizzle is the dominant condition tomorrow
    pub fn rain_tomorrow(&self) -> bool {
        self.tomorrow().map(DailyForecast::is_rainy).unwrap_or(false)
    }
}

/// Whether a provider condition label describes rain
pub fn is_rain_condition(condition: &str) -> bool {
    let condition = condition.to_lowercase();
    condition.contains("rain") || condition.contains("drizzle")
}

/// Bangla label for a provider condition; unknown labels pass through
pub fn weather_label_bn(condition: &str) -> &str {
    match condition {
        "Clear" | "Sunny" => "রৌদ্রোজ্জ্বল",
        "Clouds" | "Cloudy" => "মেঘলা",
        "Rain" => "বৃষ্টি",
        "Thunderstorm" => "ঝড়-বৃষ্টি",
        "Drizzle" => "গুড়ি গুড়ি বৃষ্টি",
        "Fog" | "Mist" | "Haze" => "কুয়াশা",
        other => other,
    }
}

/// A raw provider reading (typically every 3 hours)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyReading {
    pub timestamp: DateTime<Utc>,
    pub temp: Decimal,
    pub humidity: i32,
    /// Probability of precipitation, 0-1
    pub pop: Decimal,
    pub condition: String,
}

#[derive(Default)]
struct DayAccumulator {
    date: Option<NaiveDate>,
    max_temp: Option<Decimal>,
    max_humidity: i32,
    max_rain_prob: Decimal,
    conditions: Vec<(String, usize)>,
}

impl DayAccumulator {
    fn add(&mut self, reading: &HourlyReading) {
        self.max_temp = Some(match self.max_temp {
            Some(t) if t >= reading.temp => t,
            _ => reading.temp,
        });
        self.max_humidity = self.max_humidity.max(reading.humidity);
        self.max_rain_prob = self.max_rain_prob.max(reading.pop * Decimal::from(100));

        match self.conditions.iter_mut().find(|(c, _)| c == &reading.condition) {
            Some((_, count)) => *count += 1,
            None => self.conditions.push((reading.condition.clone(), 1)),
        }
    }

    /// Most frequent condition; later conditions win ties
    fn dominant_condition(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.conditions {
            best = match best {
                Some(current) if current.1 > entry.1 => Some(current),
                _ => Some(entry),
            };
        }
        best.map(|(c, _)| c.clone()).unwrap_or_default()
    }

    fn finish(self, date: NaiveDate) -> DailyForecast {
        let weather = self.dominant_condition();
        DailyForecast {
            date,
            temp: self.max_temp.unwrap_or_default().round(),
            rain_prob: self.max_rain_prob.round().to_i32().unwrap_or(0).clamp(0, 100),
            humidity: self.max_humidity,
            weather,
        }
    }
}

/// Collapse raw readings into daily summaries.
///
/// Readings are grouped by local date (using `offset`), each day keeps its
/// maximum temperature, humidity and rain probability plus its most frequent
/// condition. At most [`MAX_SUMMARY_DAYS`] days are kept; the first becomes
/// the current conditions and the rest the forecast. Returns None when there
/// are no readings.
pub fn summarize_daily(readings: &[HourlyReading], offset: FixedOffset) -> Option<WeatherForecast> {
    let mut days: Vec<DayAccumulator> = Vec::new();

    for reading in readings {
        let date = reading.timestamp.with_timezone(&offset).date_naive();
        match days.iter_mut().find(|d| d.date == Some(date)) {
            Some(day) => day.add(reading),
            None => {
                let mut day = DayAccumulator {
                    date: Some(date),
                    ..Default::default()
                };
                day.add(reading);
                days.push(day);
            }
        }
    }

    days.sort_by_key(|d| d.date);
    let mut summaries: Vec<DailyForecast> = days
        .into_iter()
        .take(MAX_SUMMARY_DAYS)
        .filter_map(|d| d.date.map(|date| d.finish(date)))
        .collect();

    if summaries.is_empty() {
        return None;
    }

    let today = summaries.remove(0);
    Some(WeatherForecast {
        current: CurrentConditions {
            temp: Some(today.temp),
            humidity: Some(today.humidity),
            weather: Some(today.weather),
        },
        forecast: summaries,
    })
}

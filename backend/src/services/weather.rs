//! Forecast feed
//!
//! Holds the latest normalized forecast and pushes every update to
//! subscribers. Fetching from a weather provider happens outside this crate.

use chrono::FixedOffset;
use shared::{summarize_daily, HourlyReading, WeatherForecast};
use tokio::sync::watch;

use crate::error::{AppError, AppResult};

pub struct ForecastFeed {
    tx: watch::Sender<Option<WeatherForecast>>,
}

impl Default for ForecastFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the latest forecast
    pub fn publish(&self, forecast: WeatherForecast) {
        tracing::info!(days = forecast.forecast.len(), "Forecast published");
        self.tx.send_replace(Some(forecast));
    }

    /// Summarize raw provider readings and publish the result
    pub fn publish_readings(
        &self,
        readings: &[HourlyReading],
        utc_offset_minutes: i32,
    ) -> AppResult<WeatherForecast> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| AppError::Validation {
                field: "utcOffsetMinutes".to_string(),
                message: "UTC offset out of range".to_string(),
                message_bn: "সময় অঞ্চল সঠিক নয়".to_string(),
            })?;
        let forecast = summarize_daily(readings, offset).ok_or_else(|| AppError::Validation {
            field: "readings".to_string(),
            message: "At least one reading is required".to_string(),
            message_bn: "অন্তত একটি আবহাওয়া তথ্য দিতে হবে".to_string(),
        })?;

        self.publish(forecast.clone());
        Ok(forecast)
    }

    pub fn latest(&self) -> Option<WeatherForecast> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<WeatherForecast>> {
        self.tx.subscribe()
    }
}

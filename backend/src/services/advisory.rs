//! Advisory service
//!
//! Picks the advisory for a crop and pushes every warning to the farmer by SMS.

use shared::{alert_text, generate_advisory, Advisory, Language, RiskLevel, WeatherForecast};

use crate::services::notification::NotificationService;

#[derive(Clone)]
pub struct AdvisoryService {
    notifications: NotificationService,
    /// Language of outgoing alerts
    language: Language,
}

impl AdvisoryService {
    pub fn new(notifications: NotificationService) -> Self {
        Self {
            notifications,
            language: Language::Bangla,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Generate an advisory. Anything other than the favorable default is
    /// also sent as an SMS in the background.
    pub fn advise(
        &self,
        crop: &str,
        weather: Option<&WeatherForecast>,
        risk_level: RiskLevel,
    ) -> Advisory {
        let advisory = generate_advisory(crop, weather, risk_level);

        if !advisory.is_default() {
            tracing::debug!(crop, rule = ?advisory.rule, %risk_level, "Advisory raised");
            self.notifications
                .dispatch(alert_text(crop, weather, &advisory, self.language));
        }

        advisory
    }
}

//! Notification service for farmer alerts
//!
//! Delivery is fire-and-forget: the caller never waits on the gateway and
//! delivery failures are logged, never returned.

use std::sync::Arc;

use crate::external::SmsSender;

#[derive(Clone)]
pub struct NotificationService {
    sms: Option<Arc<dyn SmsSender>>,
    phone_number: String,
}

impl NotificationService {
    pub fn new(sms: Arc<dyn SmsSender>, phone_number: impl Into<String>) -> Self {
        Self {
            sms: Some(sms),
            phone_number: phone_number.into(),
        }
    }

    /// Service that drops every alert
    pub fn disabled() -> Self {
        Self {
            sms: None,
            phone_number: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sms.is_some()
    }

    /// Queue an SMS on the runtime and return immediately.
    /// Returns false when nothing was dispatched.
    pub fn dispatch(&self, message: impl Into<String>) -> bool {
        let Some(sms) = self.sms.clone() else {
            return false;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No runtime available, alert not sent");
            return false;
        };

        let to = self.phone_number.clone();
        let message = message.into();
        runtime.spawn(async move {
            if let Err(e) = sms.send(&to, &message).await {
                tracing::warn!(error = %e, "Failed to send SMS alert");
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::SimulatedSmsGateway;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dispatch_is_asynchronous() {
        let gateway = Arc::new(SimulatedSmsGateway::new());
        let service = NotificationService::new(gateway.clone(), "+8801711000000");

        assert!(service.dispatch("আলু গুদামে ফ্যান চালু করুন"));
        for _ in 0..50 {
            if gateway.sent_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(gateway.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_drops_alerts() {
        let service = NotificationService::disabled();
        assert!(!service.is_enabled());
        assert!(!service.dispatch("ignored"));
    }

    #[test]
    fn test_dispatch_without_runtime() {
        let service = NotificationService::new(Arc::new(SimulatedSmsGateway::new()), "User");
        assert!(!service.dispatch("ignored"));
    }
}

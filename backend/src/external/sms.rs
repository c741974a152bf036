//! SMS delivery
//!
//! No carrier integration is wired up; the simulated gateway writes every
//! message to the log under the `sms` target.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("gateway error: {0}")]
    Gateway(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), SmsError>;
}

/// Gateway that logs messages instead of delivering them
#[derive(Default)]
pub struct SimulatedSmsGateway {
    sent: AtomicUsize,
}

impl SimulatedSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SmsSender for SimulatedSmsGateway {
    async fn send(&self, to: &str, text: &str) -> Result<(), SmsError> {
        if to.trim().is_empty() {
            return Err(SmsError::InvalidRecipient(to.to_string()));
        }
        tracing::info!(target: "sms", "[SMS SENT to {}]: {}", to, text);
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

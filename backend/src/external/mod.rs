//! External API integrations

pub mod sms;

pub use sms::{SimulatedSmsGateway, SmsError, SmsSender};

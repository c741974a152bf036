//! Configuration management for the Post-Harvest Risk Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PHR_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use uuid::Uuid;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Remote batch database configuration
    pub database: DatabaseConfig,

    /// Offline write queue configuration
    pub queue: QueueConfig,

    /// Sync coordinator configuration
    pub sync: SyncConfig,

    /// Alert delivery configuration
    pub notification: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Without one the remote collection is kept in memory.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    /// Directory holding the durable key-value slots
    pub path: String,

    /// Key of the slot holding unsynced batches
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Owner stamped on batches saved from this device
    pub user_id: Uuid,

    /// Initial connectivity state
    pub start_online: bool,

    /// Upper bound on a single remote call, in milliseconds
    pub remote_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// Send advisories through the SMS gateway
    pub sms_enabled: bool,

    /// Recipient of SMS advisories
    pub phone_number: String,

    /// Language of SMS advisories ("bn" or "en")
    pub language: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("PHR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("queue.path", "data")?
            .set_default("queue.key", crate::services::queue::DEFAULT_QUEUE_KEY)?
            .set_default("sync.user_id", Uuid::nil().to_string())?
            .set_default("sync.start_online", true)?
            .set_default("sync.remote_timeout_ms", 10_000)?
            .set_default("notification.sms_enabled", true)?
            .set_default("notification.phone_number", "User")?
            .set_default("notification.language", "bn")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PHR_ prefix)
            .add_source(
                Environment::with_prefix("PHR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

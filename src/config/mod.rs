//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `NOTIFICATION_FEED` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use notification_feed::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Live channel at {}", config.channel.ws_base_url);
//! ```

mod channel;
mod credentials;
mod error;
mod feed;
mod history;
mod runtime;

pub use channel::ChannelConfig;
pub use credentials::CredentialsConfig;
pub use error::{ConfigError, ValidationError};
pub use feed::FeedConfig;
pub use history::HistoryConfig;
pub use runtime::{Environment, RuntimeConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// local setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Environment and log filter
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// REST history endpoint
    #[serde(default)]
    pub history: HistoryConfig,

    /// Live WebSocket channel and reconnect policy
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Store retention and queue depth
    #[serde(default)]
    pub feed: FeedConfig,

    /// Signed-in user for standalone runs
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `NOTIFICATION_FEED` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `NOTIFICATION_FEED__CHANNEL__MAX_ATTEMPTS=8` -> `channel.max_attempts = 8`
    /// - `NOTIFICATION_FEED__CREDENTIALS__TOKEN=...` -> `credentials.token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NOTIFICATION_FEED")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.history.validate()?;
        self.channel.validate(&self.runtime.environment)?;
        self.feed.validate()?;
        self.credentials.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "NOTIFICATION_FEED__RUNTIME__ENVIRONMENT",
        "NOTIFICATION_FEED__HISTORY__BASE_URL",
        "NOTIFICATION_FEED__CHANNEL__WS_BASE_URL",
        "NOTIFICATION_FEED__CHANNEL__MAX_ATTEMPTS",
        "NOTIFICATION_FEED__FEED__MAX_ENTRIES",
        "NOTIFICATION_FEED__CREDENTIALS__USER_ID",
        "NOTIFICATION_FEED__CREDENTIALS__TOKEN",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.history.base_url, "http://localhost:8000");
        assert_eq!(config.channel.max_attempts, 5);
        assert_eq!(config.feed.max_entries(), Some(200));
        assert!(config.credentials.user_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("NOTIFICATION_FEED__HISTORY__BASE_URL", "https://api.example.com");
        env::set_var("NOTIFICATION_FEED__CHANNEL__WS_BASE_URL", "wss://api.example.com");
        env::set_var("NOTIFICATION_FEED__CHANNEL__MAX_ATTEMPTS", "8");
        env::set_var("NOTIFICATION_FEED__FEED__MAX_ENTRIES", "0");
        env::set_var("NOTIFICATION_FEED__CREDENTIALS__USER_ID", "42");
        env::set_var("NOTIFICATION_FEED__CREDENTIALS__TOKEN", "jwt");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.history.base_url, "https://api.example.com");
        assert_eq!(config.channel.reconnect_policy().max_attempts, 8);
        assert_eq!(config.feed.max_entries(), None);

        let creds = config.credentials.to_credentials();
        assert_eq!(creds.user_id.as_ref().unwrap().as_str(), "42");
        assert_eq!(creds.bearer_token(), Some("jwt"));
    }

    #[test]
    fn test_production_requires_secure_channel() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("NOTIFICATION_FEED__RUNTIME__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::ChannelMustBeSecure));
    }
}

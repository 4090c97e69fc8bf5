//! Live channel configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::runtime::Environment;
use crate::adapters::websocket::WebSocketTransportConfig;
use crate::application::ReconnectPolicy;

/// WebSocket endpoint and reconnect settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// `ws://` or `wss://` origin; `/ws/notifications/{user_id}` is appended
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Consecutive failures before giving up; 0 disables reconnects
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    #[serde(default = "default_jitter")]
    pub jitter: bool,

    /// Uptime after which a dropped connection no longer counts as a failure
    #[serde(default = "default_stable_after")]
    pub stable_after_secs: u64,
}

impl ChannelConfig {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
            .with_jitter(self.jitter)
            .with_stable_after(Duration::from_secs(self.stable_after_secs))
    }

    /// Settings for the tokio-tungstenite adapter
    pub fn transport_config(&self) -> WebSocketTransportConfig {
        WebSocketTransportConfig::new(self.ws_base_url.clone())
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Validate channel configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secure = self.ws_base_url.starts_with("wss://");
        if !secure && !self.ws_base_url.starts_with("ws://") {
            return Err(ValidationError::InvalidChannelUrl);
        }
        if *environment == Environment::Production && !secure {
            return Err(ValidationError::ChannelMustBeSecure);
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("channel.connect_timeout_secs"));
        }
        if self.initial_backoff_ms == 0 || self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            jitter: default_jitter(),
            stable_after_secs: default_stable_after(),
        }
    }
}

fn default_ws_base_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_jitter() -> bool {
    true
}

fn default_stable_after() -> u64 {
    30
}

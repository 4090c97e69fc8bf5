//! History endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::http::HttpHistoryConfig;

/// REST history collaborator settings
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Base URL of the REST API; `/notifications` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on the history load, after which the feed runs live-only
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl HistoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client settings for the reqwest adapter
    pub fn client_config(&self) -> HttpHistoryConfig {
        HttpHistoryConfig::new(self.base_url.clone()).with_timeout(self.timeout())
    }

    /// Validate history configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidHistoryUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("history.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    10
}

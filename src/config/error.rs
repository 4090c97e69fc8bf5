//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid history base URL (expected http:// or https://)")]
    InvalidHistoryUrl,

    #[error("Invalid live channel URL (expected ws:// or wss://)")]
    InvalidChannelUrl,

    #[error("Live channel must use wss:// in production")]
    ChannelMustBeSecure,

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(&'static str),

    #[error("Reconnect initial backoff must be positive and not exceed max backoff")]
    InvalidBackoff,

    #[error("Store queue capacity must be positive")]
    InvalidQueueCapacity,

    #[error("Invalid user id: must not be blank")]
    BlankUserId,
}

//! Feed store configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::DEFAULT_QUEUE_CAPACITY;

/// Notification store settings
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Retention cap; 0 keeps everything
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Depth of the store command queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl FeedConfig {
    pub fn max_entries(&self) -> Option<usize> {
        (self.max_entries > 0).then_some(self.max_entries)
    }

    /// Validate feed configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_max_entries() -> usize {
    200
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

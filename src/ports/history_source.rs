//! HistorySource port - one-shot fetch of persisted notifications.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::NotificationDraft;

use super::Credentials;

/// Result of a history fetch.
///
/// Individual malformed records are dropped rather than failing the fetch;
/// `rejected` counts them.
#[derive(Debug, Clone, Default)]
pub struct HistoryBatch {
    pub drafts: Vec<NotificationDraft>,
    pub rejected: usize,
}

/// Errors from the history collaborator.
///
/// None of these are fatal to a session: the feed simply runs without history.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Missing, expired or rejected bearer token.
    #[error("Not authorized to load notifications")]
    Unauthorized,

    /// Network failure or non-success status.
    #[error("History service unavailable: {0}")]
    Unavailable(String),

    /// The response body was not a list of records.
    #[error("Malformed history response: {0}")]
    Malformed(String),
}

/// Port for fetching the notification history of the signed-in user.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetches the history visible to the holder of `credentials`.
    async fn fetch(&self, credentials: &Credentials) -> Result<HistoryBatch, HistoryError>;
}

//! NotificationSink port - where decoded live events go.
//!
//! The channel manager calls `deliver` once per successfully decoded frame
//! and never touches feed state itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::NotificationDraft;

/// The receiving side has shut down; no further deliveries are possible.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Notification sink closed")]
pub struct SinkClosed;

/// Single ingestion entry point for live events.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, draft: NotificationDraft) -> Result<(), SinkClosed>;
}

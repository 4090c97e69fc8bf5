//! Scripted history source.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::domain::notification::NotificationDraft;
use crate::ports::{Credentials, HistoryBatch, HistoryError, HistorySource};

/// Releases a gated [`InMemoryHistorySource`].
#[derive(Clone)]
pub struct HistoryGate(Arc<Notify>);

impl HistoryGate {
    /// Lets the pending (or next) fetch complete.
    pub fn release(&self) {
        self.0.notify_one();
    }
}

/// History source answering every fetch with a fixed result.
///
/// # Example
///
/// ```ignore
/// let history = InMemoryHistorySource::with_drafts(vec![draft]);
/// let batch = history.fetch(&credentials).await?;
/// assert_eq!(history.fetch_count(), 1);
/// ```
pub struct InMemoryHistorySource {
    result: Mutex<Result<HistoryBatch, HistoryError>>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    fetches: AtomicUsize,
    require_token: bool,
}

impl InMemoryHistorySource {
    pub fn new(result: Result<HistoryBatch, HistoryError>) -> Self {
        Self {
            result: Mutex::new(result),
            delay: None,
            gate: None,
            fetches: AtomicUsize::new(0),
            require_token: false,
        }
    }

    /// Source with no history.
    pub fn empty() -> Self {
        Self::new(Ok(HistoryBatch::default()))
    }

    pub fn with_drafts(drafts: Vec<NotificationDraft>) -> Self {
        Self::new(Ok(HistoryBatch {
            drafts,
            rejected: 0,
        }))
    }

    pub fn failing(error: HistoryError) -> Self {
        Self::new(Err(error))
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answers with `Unauthorized` when no bearer token is supplied.
    pub fn requiring_token(mut self) -> Self {
        self.require_token = true;
        self
    }

    /// Holds every fetch until the returned gate is released.
    pub fn gated(mut self) -> (Self, HistoryGate) {
        let notify = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&notify));
        (self, HistoryGate(notify))
    }

    // === Test Helpers ===

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for InMemoryHistorySource {
    async fn fetch(&self, credentials: &Credentials) -> Result<HistoryBatch, HistoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.require_token && credentials.bearer_token().is_none() {
            return Err(HistoryError::Unauthorized);
        }

        self.result.lock().expect("history lock poisoned").clone()
    }
}

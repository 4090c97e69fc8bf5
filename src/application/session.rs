//! NotificationSession - scoped lifetime of one user's feed.
//!
//! `start` acquires everything a session needs: the store actor, the history
//! load and the live channel. `stop` releases them in order, and dropping
//! the session aborts whatever is still running, so no task outlives it.
//!
//! History and live events race freely. Both end up in the store queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::AppConfig;
use crate::domain::foundation::{NotificationId, UserId};
use crate::domain::notification::FeedSnapshot;
use crate::ports::{Credentials, HistoryError, HistorySource, LiveTransport};

use super::{
    ChannelManager, ChannelState, NotificationStore, ReconnectPolicy, StoreError, StoreHandle,
    DEFAULT_QUEUE_CAPACITY,
};

/// Outcome of the one-shot history load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStatus {
    Pending,
    Loaded { count: usize, rejected: usize },
    /// Token missing or rejected. Shown as "unable to load notifications".
    Unauthorized,
    Unavailable(String),
    /// No answer within the history timeout; the feed runs live-only.
    TimedOut,
}

impl HistoryStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, HistoryStatus::Pending)
    }
}

/// What a presentation layer needs for its degraded-mode indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub history: HistoryStatus,
    pub channel: ChannelState,
}

/// Tunables for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub history_timeout: Duration,
    pub max_entries: Option<usize>,
    pub queue_capacity: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            history_timeout: Duration::from_secs(10),
            max_entries: Some(200),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            history_timeout: config.history.timeout(),
            max_entries: config.feed.max_entries(),
            queue_capacity: config.feed.queue_capacity,
            reconnect: config.channel.reconnect_policy(),
        }
    }

    pub fn with_history_timeout(mut self, timeout: Duration) -> Self {
        self.history_timeout = timeout;
        self
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}

/// One user's live notification feed.
pub struct NotificationSession {
    user_id: Option<UserId>,
    store: StoreHandle,
    store_task: JoinHandle<()>,
    history_task: JoinHandle<()>,
    history_status: watch::Receiver<HistoryStatus>,
    channel: ChannelManager,
}

impl NotificationSession {
    /// Starts the store, kicks off the history load and opens the channel.
    ///
    /// Without a signed-in user the channel stays idle and the session only
    /// shows whatever history the token can load.
    pub async fn start(
        settings: SessionSettings,
        history: Arc<dyn HistorySource>,
        transport: Arc<dyn LiveTransport>,
        credentials: Credentials,
    ) -> Self {
        let (store, store_task) =
            NotificationStore::spawn(settings.max_entries, settings.queue_capacity);

        let (status_tx, status_rx) = watch::channel(HistoryStatus::Pending);
        let history_task = tokio::spawn(load_history(
            history,
            credentials.clone(),
            store.clone(),
            settings.history_timeout,
            status_tx,
        ));

        let user_id = credentials.user_id.clone();
        let mut channel = ChannelManager::new(
            transport,
            Arc::new(store.clone()),
            settings.reconnect.clone(),
        );
        channel.open(credentials).await;

        match &user_id {
            Some(user_id) => tracing::info!(user_id = %user_id, "Notification session started"),
            None => tracing::info!("Notification session started without a user"),
        }

        Self {
            user_id,
            store,
            store_task,
            history_task,
            history_status: status_rx,
            channel,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Ordered feed and unread count.
    pub async fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
        self.store.snapshot().await
    }

    /// Receiver notified on every feed change.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.store.subscribe()
    }

    /// Receiver notified on every channel state transition.
    pub fn subscribe_channel(&self) -> watch::Receiver<ChannelState> {
        self.channel.subscribe_state()
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<bool, StoreError> {
        self.store.mark_read(id).await
    }

    pub async fn mark_all_read(&self) -> Result<usize, StoreError> {
        self.store.mark_all_read().await
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            history: self.history_status.borrow().clone(),
            channel: self.channel.state(),
        }
    }

    /// Waits until the history load has succeeded, failed or timed out.
    pub async fn wait_for_history(&self) -> HistoryStatus {
        let mut status = self.history_status.clone();
        if let Ok(settled) = status.wait_for(HistoryStatus::is_settled).await {
            return settled.clone();
        }
        // Loader was cancelled before it settled.
        let current = status.borrow().clone();
        current
    }

    /// Closes the channel, cancels a pending history load and stops the store.
    pub async fn stop(mut self) {
        self.channel.close().await;
        self.history_task.abort();
        self.store.shutdown().await;
        if let Err(e) = (&mut self.store_task).await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "Notification store task failed");
            }
        }

        match &self.user_id {
            Some(user_id) => tracing::info!(user_id = %user_id, "Notification session stopped"),
            None => tracing::info!("Notification session stopped"),
        }
    }
}

impl Drop for NotificationSession {
    fn drop(&mut self) {
        self.history_task.abort();
        self.store_task.abort();
    }
}

async fn load_history(
    history: Arc<dyn HistorySource>,
    credentials: Credentials,
    store: StoreHandle,
    timeout: Duration,
    status: watch::Sender<HistoryStatus>,
) {
    let settled = match time::timeout(timeout, history.fetch(&credentials)).await {
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "History fetch timed out, running live-only");
            HistoryStatus::TimedOut
        }
        Ok(Err(HistoryError::Unauthorized)) => {
            tracing::warn!("History fetch unauthorized, running live-only");
            HistoryStatus::Unauthorized
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "History fetch failed, running live-only");
            HistoryStatus::Unavailable(e.to_string())
        }
        Ok(Ok(batch)) => {
            let count = batch.drafts.len();
            if batch.rejected > 0 {
                tracing::warn!(rejected = batch.rejected, "Dropped malformed history records");
            }
            if store.seed(batch.drafts).await.is_err() {
                return;
            }
            HistoryStatus::Loaded {
                count,
                rejected: batch.rejected,
            }
        }
    };

    status.send_replace(settled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryHistorySource, InMemoryTransport};
    use crate::domain::foundation::Timestamp;
    use crate::domain::notification::NotificationDraft;

    fn user() -> Credentials {
        Credentials::for_user(UserId::new("42").unwrap()).with_token("token")
    }

    fn settings() -> SessionSettings {
        SessionSettings::default()
            .with_history_timeout(Duration::from_millis(200))
            .with_reconnect(ReconnectPolicy::disabled())
    }

    fn stored(id: &str, secs: i64) -> NotificationDraft {
        NotificationDraft::new(format!("title {id}"), "m")
            .with_id(NotificationId::new(id).unwrap())
            .with_created_at(Timestamp::from_unix_millis(1_700_000_000_000 + secs * 1_000).unwrap())
    }

    #[tokio::test]
    async fn history_is_seeded_and_reported() {
        let history = Arc::new(InMemoryHistorySource::with_drafts(vec![
            stored("a", 1),
            stored("b", 2),
        ]));
        let transport = Arc::new(InMemoryTransport::new());
        let _conn = transport.accept_next();

        let session = NotificationSession::start(settings(), history, transport, user()).await;

        assert_eq!(
            session.wait_for_history().await,
            HistoryStatus::Loaded { count: 2, rejected: 0 }
        );
        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.unread_count, 2);
        assert_eq!(snapshot.notifications[0].id.as_str(), "b");

        session.stop().await;
    }

    #[tokio::test]
    async fn slow_history_times_out_into_live_only_mode() {
        let history = Arc::new(InMemoryHistorySource::empty().with_delay(Duration::from_secs(5)));
        let transport = Arc::new(InMemoryTransport::new());
        let _conn = transport.accept_next();

        let session = NotificationSession::start(
            settings().with_history_timeout(Duration::from_millis(20)),
            history,
            transport,
            user(),
        )
        .await;

        assert_eq!(session.wait_for_history().await, HistoryStatus::TimedOut);
        session.stop().await;
    }

    #[tokio::test]
    async fn unauthorized_history_keeps_channel_running() {
        let history = Arc::new(InMemoryHistorySource::failing(HistoryError::Unauthorized));
        let transport = Arc::new(InMemoryTransport::new());
        let conn = transport.accept_next();

        let session = NotificationSession::start(settings(), history, transport, user()).await;
        let mut updates = session.subscribe();

        assert_eq!(session.wait_for_history().await, HistoryStatus::Unauthorized);

        conn.send_text(r#"{"id":"n1","title":"Offer sent","message":"m"}"#).await;
        time::timeout(Duration::from_secs(2), updates.changed())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.snapshot().await.unwrap().unread_count, 1);
        assert_eq!(session.status().history, HistoryStatus::Unauthorized);
        session.stop().await;
    }

    #[tokio::test]
    async fn session_without_user_loads_history_only() {
        let history = Arc::new(InMemoryHistorySource::with_drafts(vec![stored("a", 1)]));
        let transport = Arc::new(InMemoryTransport::new());

        let session = NotificationSession::start(
            settings(),
            history,
            transport.clone(),
            Credentials::default(),
        )
        .await;

        session.wait_for_history().await;
        assert_eq!(session.status().channel, ChannelState::Idle);
        assert_eq!(transport.connect_count(), 0);
        assert!(session.user_id().is_none());
        session.stop().await;
    }

    #[tokio::test]
    async fn stop_closes_the_live_connection() {
        let history = Arc::new(InMemoryHistorySource::empty());
        let transport = Arc::new(InMemoryTransport::new());
        let conn = transport.accept_next();

        let session = NotificationSession::start(settings(), history, transport, user()).await;
        let mut channel = session.subscribe_channel();
        channel
            .wait_for(|s| *s == ChannelState::Connected)
            .await
            .unwrap();

        session.stop().await;
        assert!(conn.is_closed());
    }
}

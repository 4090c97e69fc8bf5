//! NotificationStore - single-owner actor around the feed.
//!
//! History seeding and live ingestion race each other. Both are turned
//! into commands on one queue and applied by one task, so the feed is never
//! mutated concurrently and the merge rules see a total order of writes.
//!
//! ```text
//!  history task ──seed──┐
//!  channel task ─ingest─┼──► mpsc ──► NotificationStore ──watch──► readers
//!  presentation ─mark───┘                (owns NotificationFeed)
//! ```

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::domain::foundation::{NotificationId, Timestamp};
use crate::domain::notification::{
    FeedSnapshot, IngestOutcome, NotificationDraft, NotificationFeed, SeedReport,
};
use crate::ports::{NotificationSink, SinkClosed};

/// Default command queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// The store task has stopped; the session is over.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Notification store has shut down")]
    Closed,
}

enum StoreCommand {
    Seed {
        drafts: Vec<NotificationDraft>,
        reply: oneshot::Sender<SeedReport>,
    },
    Ingest {
        draft: NotificationDraft,
        reply: oneshot::Sender<IngestOutcome>,
    },
    MarkRead {
        id: NotificationId,
        reply: oneshot::Sender<bool>,
    },
    MarkAllRead {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        reply: oneshot::Sender<FeedSnapshot>,
    },
    Shutdown,
}

/// Owner of the feed. Created with [`NotificationStore::spawn`].
pub struct NotificationStore {
    feed: NotificationFeed,
    commands: mpsc::Receiver<StoreCommand>,
    updates: watch::Sender<FeedSnapshot>,
}

impl NotificationStore {
    /// Starts the store task and returns a handle to it.
    ///
    /// The task exits on [`StoreHandle::shutdown`] or once every handle is dropped.
    pub fn spawn(max_entries: Option<usize>, queue_capacity: usize) -> (StoreHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(queue_capacity.max(1));
        let (updates_tx, updates_rx) = watch::channel(FeedSnapshot::default());

        let store = Self {
            feed: NotificationFeed::new(max_entries),
            commands: command_rx,
            updates: updates_tx,
        };
        let task = tokio::spawn(store.run());

        let handle = StoreHandle {
            commands: command_tx,
            updates: updates_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        tracing::debug!(entries = self.feed.len(), "Notification store stopped");
    }

    /// Applies one command. Returns false when the store should stop.
    fn handle(&mut self, command: StoreCommand) -> bool {
        match command {
            StoreCommand::Seed { drafts, reply } => {
                let report = self.feed.seed(drafts, Timestamp::now());
                tracing::debug!(
                    inserted = report.inserted,
                    updated = report.updated,
                    unchanged = report.unchanged,
                    evicted = report.evicted,
                    "Seeded feed from history"
                );
                if report.inserted + report.updated + report.evicted > 0 {
                    self.publish();
                }
                let _ = reply.send(report);
            }
            StoreCommand::Ingest { draft, reply } => {
                let outcome = self.feed.ingest(draft, Timestamp::now());
                if matches!(outcome, IngestOutcome::Inserted | IngestOutcome::Updated) {
                    self.publish();
                }
                let _ = reply.send(outcome);
            }
            StoreCommand::MarkRead { id, reply } => {
                let found = self.feed.mark_read(&id);
                if found {
                    self.publish();
                } else {
                    tracing::debug!(notification_id = %id, "Mark read for unknown notification");
                }
                let _ = reply.send(found);
            }
            StoreCommand::MarkAllRead { reply } => {
                let changed = self.feed.mark_all_read();
                if changed > 0 {
                    self.publish();
                }
                let _ = reply.send(changed);
            }
            StoreCommand::Snapshot { reply } => {
                let _ = reply.send(self.feed.snapshot());
            }
            StoreCommand::Shutdown => return false,
        }
        true
    }

    fn publish(&self) {
        self.updates.send_replace(self.feed.snapshot());
    }
}

/// Cloneable handle for talking to the store task.
#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<StoreCommand>,
    updates: watch::Receiver<FeedSnapshot>,
}

impl StoreHandle {
    /// Merges a history snapshot.
    pub async fn seed(&self, drafts: Vec<NotificationDraft>) -> Result<SeedReport, StoreError> {
        self.request(|reply| StoreCommand::Seed { drafts, reply }).await
    }

    /// Merges one live event.
    pub async fn ingest(&self, draft: NotificationDraft) -> Result<IngestOutcome, StoreError> {
        self.request(|reply| StoreCommand::Ingest { draft, reply }).await
    }

    /// Marks one notification read. `Ok(false)` when the id is unknown.
    pub async fn mark_read(&self, id: &NotificationId) -> Result<bool, StoreError> {
        let id = id.clone();
        self.request(|reply| StoreCommand::MarkRead { id, reply }).await
    }

    /// Marks every notification read, returning how many changed.
    pub async fn mark_all_read(&self) -> Result<usize, StoreError> {
        self.request(|reply| StoreCommand::MarkAllRead { reply }).await
    }

    /// Current ordered feed and unread count.
    pub async fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
        self.request(|reply| StoreCommand::Snapshot { reply }).await
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.updates.clone()
    }

    /// Asks the store task to stop after already-queued commands.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(StoreCommand::Shutdown).await;
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> Result<T, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(build(reply_tx))
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)
    }
}

#[async_trait]
impl NotificationSink for StoreHandle {
    async fn deliver(&self, draft: NotificationDraft) -> Result<(), SinkClosed> {
        let outcome = self.ingest(draft).await.map_err(|_| SinkClosed)?;
        tracing::trace!(?outcome, "Live notification ingested");
        Ok(())
    }
}

//! ChannelManager - lifecycle of the per-user live channel.
//!
//! Owns at most one background connection task at a time. The task connects
//! through a [`LiveTransport`], decodes every inbound frame into a
//! [`NotificationDraft`] and hands it to a [`NotificationSink`]. It never
//! touches feed state.
//!
//! ## States
//!
//! ```text
//! Idle ─open─► Connecting ─ok─► Connected ─first decode─► Live
//!                 ▲                 │                      │
//!                 │              dropped ◄─────────────────┘
//!                 │                 ▼
//!                 └─ delay ── Reconnecting ─budget spent─► Disconnected
//!
//! close() from any state ─► Closed
//! ```
//!
//! ## Graceful Shutdown
//!
//! `close` signals the task through a watch channel and waits a short grace
//! period for it to finish before aborting it. Dropping the manager aborts
//! the task outright, so no delivery can happen after teardown.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::domain::foundation::{ConnectionId, DecodeError, UserId};
use crate::domain::notification::NotificationDraft;
use crate::ports::{
    Credentials, FrameStream, InboundFrame, LiveTransport, NotificationSink, TransportError,
};

use super::ReconnectPolicy;

const CLOSE_GRACE: Duration = Duration::from_millis(250);

/// Observable state of the live channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel has been opened.
    Idle,
    /// Opening connection number `attempt` since the last healthy one.
    Connecting { attempt: u32 },
    /// Connected, nothing decoded yet.
    Connected,
    /// At least one frame decoded on the current connection.
    Live,
    /// Waiting `delay` before retry number `attempt`.
    Reconnecting { attempt: u32, delay: Duration },
    /// Gave up. The feed keeps working from history only.
    Disconnected { reason: String },
    /// Closed on request.
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Idle => write!(f, "idle"),
            ChannelState::Connecting { attempt } => write!(f, "connecting (attempt {})", attempt),
            ChannelState::Connected => write!(f, "connected"),
            ChannelState::Live => write!(f, "live"),
            ChannelState::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting (attempt {} in {:?})", attempt, delay)
            }
            ChannelState::Disconnected { reason } => write!(f, "disconnected: {}", reason),
            ChannelState::Closed => write!(f, "closed"),
        }
    }
}

struct ActiveChannel {
    user_id: UserId,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Maintains exactly one live channel per manager.
pub struct ChannelManager {
    transport: Arc<dyn LiveTransport>,
    sink: Arc<dyn NotificationSink>,
    policy: ReconnectPolicy,
    state: watch::Sender<ChannelState>,
    active: Option<ActiveChannel>,
}

impl ChannelManager {
    pub fn new(
        transport: Arc<dyn LiveTransport>,
        sink: Arc<dyn NotificationSink>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (state, _) = watch::channel(ChannelState::Idle);
        Self {
            transport,
            sink,
            policy,
            state,
            active: None,
        }
    }

    /// Opens a channel for the user in `credentials`.
    ///
    /// Any existing channel is closed first. Returns `false` without opening
    /// anything when no user is signed in.
    pub async fn open(&mut self, credentials: Credentials) -> bool {
        self.close().await;

        let Some(user_id) = credentials.user_id.clone() else {
            tracing::debug!("No user signed in, live channel not opened");
            return false;
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = ChannelWorker {
            user_id: user_id.clone(),
            credentials,
            transport: Arc::clone(&self.transport),
            sink: Arc::clone(&self.sink),
            policy: self.policy.clone(),
            state: self.state.clone(),
        };
        let task = tokio::spawn(worker.run(shutdown_rx));

        tracing::info!(user_id = %user_id, "Live channel opened");
        self.active = Some(ActiveChannel {
            user_id,
            shutdown: shutdown_tx,
            task,
        });
        true
    }

    /// Terminates the channel. Safe to call any number of times.
    pub async fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let _ = active.shutdown.send(true);
        let mut task = active.task;
        if time::timeout(CLOSE_GRACE, &mut task).await.is_err() {
            tracing::warn!(user_id = %active.user_id, "Live channel did not stop in time, aborting");
            task.abort();
        }

        self.state.send_replace(ChannelState::Closed);
        tracing::info!(user_id = %active.user_id, "Live channel closed");
    }

    pub fn state(&self) -> ChannelState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state.subscribe()
    }

    /// User the current channel is scoped to.
    pub fn user_id(&self) -> Option<&UserId> {
        self.active.as_ref().map(|a| &a.user_id)
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for ChannelManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

/// How one connection ended.
enum ConnectionEnd {
    Shutdown,
    SinkClosed,
    Lost {
        error: TransportError,
        decoded: usize,
    },
}

struct ChannelWorker {
    user_id: UserId,
    credentials: Credentials,
    transport: Arc<dyn LiveTransport>,
    sink: Arc<dyn NotificationSink>,
    policy: ReconnectPolicy,
    state: watch::Sender<ChannelState>,
}

impl ChannelWorker {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        // Consecutive failures since the last healthy connection.
        let mut failures: u32 = 0;

        loop {
            self.set_state(ChannelState::Connecting {
                attempt: failures + 1,
            });

            let connected = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return,
                result = self.transport.connect(&self.user_id, &self.credentials) => result,
            };

            let error = match connected {
                Ok(stream) => {
                    let connection_id = ConnectionId::new();
                    let opened_at = Instant::now();
                    tracing::info!(
                        user_id = %self.user_id,
                        connection_id = %connection_id,
                        "Live channel connected"
                    );
                    self.set_state(ChannelState::Connected);

                    match self.pump(stream, &connection_id, &mut shutdown).await {
                        ConnectionEnd::Shutdown => return,
                        ConnectionEnd::SinkClosed => {
                            tracing::debug!(user_id = %self.user_id, "Sink closed, stopping live channel");
                            self.set_state(ChannelState::Disconnected {
                                reason: "notification store closed".to_string(),
                            });
                            return;
                        }
                        ConnectionEnd::Lost { error, decoded } => {
                            if decoded > 0 || opened_at.elapsed() >= self.policy.stable_after {
                                failures = 0;
                            }
                            error
                        }
                    }
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::warn!(user_id = %self.user_id, error = %error, "Live channel rejected, not retrying");
                self.set_state(ChannelState::Disconnected {
                    reason: error.to_string(),
                });
                return;
            }

            failures += 1;
            let Some(delay) = self.policy.delay_for(failures) else {
                tracing::warn!(
                    user_id = %self.user_id,
                    error = %error,
                    attempts = failures,
                    "Live channel lost, giving up"
                );
                self.set_state(ChannelState::Disconnected {
                    reason: error.to_string(),
                });
                return;
            };

            tracing::warn!(
                user_id = %self.user_id,
                error = %error,
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                "Live channel lost, reconnecting"
            );
            self.set_state(ChannelState::Reconnecting {
                attempt: failures,
                delay,
            });

            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => return,
                _ = time::sleep(delay) => {}
            }
        }
    }

    /// Reads frames until the connection ends or shutdown is requested.
    async fn pump(
        &self,
        mut stream: FrameStream,
        connection_id: &ConnectionId,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ConnectionEnd {
        let mut decoded = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => return ConnectionEnd::Shutdown,
                next = stream.next() => next,
            };

            let frame = match next {
                Some(Ok(frame)) => frame,
                Some(Err(error)) => return ConnectionEnd::Lost { error, decoded },
                None => {
                    return ConnectionEnd::Lost {
                        error: TransportError::Dropped("closed by server".to_string()),
                        decoded,
                    }
                }
            };

            let draft = match decode_frame(&frame) {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(
                        user_id = %self.user_id,
                        connection_id = %connection_id,
                        error = %e,
                        "Dropping malformed notification frame"
                    );
                    continue;
                }
            };

            if decoded == 0 {
                self.set_state(ChannelState::Live);
            }
            decoded += 1;

            if self.sink.deliver(draft).await.is_err() {
                return ConnectionEnd::SinkClosed;
            }
        }
    }

    fn set_state(&self, state: ChannelState) {
        self.state.send_replace(state);
    }
}

fn decode_frame(frame: &InboundFrame) -> Result<NotificationDraft, DecodeError> {
    match frame {
        InboundFrame::Text(text) => NotificationDraft::from_json_str(text),
        InboundFrame::Binary(bytes) => NotificationDraft::from_json_bytes(bytes),
    }
}

/// Resolves once shutdown is signalled or the manager is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

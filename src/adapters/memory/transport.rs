//! Scripted live transport.
//!
//! Every `connect` consumes the next scripted outcome: either a rejection or
//! a connection whose frames the test pushes through a [`LiveConnection`].

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::domain::foundation::UserId;
use crate::ports::{Credentials, FrameStream, InboundFrame, LiveTransport, TransportError};

type FrameResult = Result<InboundFrame, TransportError>;

enum Scripted {
    Accept(mpsc::UnboundedReceiver<FrameResult>),
    Reject(TransportError),
}

/// Server side of an accepted in-memory connection.
///
/// Dropping it closes the connection as seen by the client.
pub struct LiveConnection {
    frames: mpsc::UnboundedSender<FrameResult>,
}

impl LiveConnection {
    /// Pushes a text frame. Returns `false` if the client side is gone.
    pub async fn send_text(&self, text: impl Into<String>) -> bool {
        self.frames.send(Ok(InboundFrame::Text(text.into()))).is_ok()
    }

    pub async fn send_binary(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.frames.send(Ok(InboundFrame::Binary(bytes.into()))).is_ok()
    }

    /// Breaks the connection with a transport error.
    pub fn fail(self, error: TransportError) {
        let _ = self.frames.send(Err(error));
    }

    pub fn is_closed(&self) -> bool {
        self.frames.is_closed()
    }
}

/// In-memory [`LiveTransport`] driven by a script of outcomes.
///
/// When the script is empty, `connect` fails with a retryable error.
#[derive(Default)]
pub struct InMemoryTransport {
    script: Mutex<VecDeque<Scripted>>,
    connects: Mutex<Vec<String>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts an accepted connection and returns its server side.
    pub fn accept_next(&self) -> LiveConnection {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script
            .lock()
            .expect("transport lock poisoned")
            .push_back(Scripted::Accept(rx));
        LiveConnection { frames: tx }
    }

    /// Scripts a failed connection attempt.
    pub fn reject_next(&self, error: TransportError) {
        self.script
            .lock()
            .expect("transport lock poisoned")
            .push_back(Scripted::Reject(error));
    }

    // === Test Helpers ===

    pub fn connect_count(&self) -> usize {
        self.connects.lock().expect("transport lock poisoned").len()
    }

    /// Users of every connect attempt, in order.
    pub fn connected_users(&self) -> Vec<String> {
        self.connects.lock().expect("transport lock poisoned").clone()
    }
}

#[async_trait]
impl LiveTransport for InMemoryTransport {
    async fn connect(
        &self,
        user_id: &UserId,
        _credentials: &Credentials,
    ) -> Result<FrameStream, TransportError> {
        self.connects
            .lock()
            .expect("transport lock poisoned")
            .push(user_id.as_str().to_string());

        let next = self
            .script
            .lock()
            .expect("transport lock poisoned")
            .pop_front();

        match next {
            Some(Scripted::Accept(rx)) => {
                let frames = stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|frame| (frame, rx))
                });
                Ok(Box::pin(frames))
            }
            Some(Scripted::Reject(error)) => Err(error),
            None => Err(TransportError::Connect("no connection available".to_string())),
        }
    }
}

//! LiveTransport port - the per-user push connection.
//!
//! A transport only knows how to open a connection and surface its frames.
//! Lifecycle (reconnects, shutdown, decoding) lives in the channel manager.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::domain::foundation::UserId;

use super::Credentials;

/// One data frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Stream of inbound frames. Ends when the server closes the connection.
pub type FrameStream = BoxStream<'static, Result<InboundFrame, TransportError>>;

/// Errors raised while opening or reading a live connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Live channel rejected credentials")]
    Unauthorized,

    #[error("Connection dropped: {0}")]
    Dropped(String),
}

impl TransportError {
    /// Whether reconnecting may help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::Unauthorized)
    }
}

/// Port for opening the live notification channel of one user.
#[async_trait]
pub trait LiveTransport: Send + Sync {
    async fn connect(
        &self,
        user_id: &UserId,
        credentials: &Credentials,
    ) -> Result<FrameStream, TransportError>;
}

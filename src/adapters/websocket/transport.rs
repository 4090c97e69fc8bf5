//! WebSocket client for the per-user notification endpoint.
//!
//! Connects to `{base_url}/ws/notifications/{user_id}`. The bearer token,
//! when present, rides on the upgrade request as an `Authorization` header.
//! Data messages become [`InboundFrame`]s; control messages are consumed
//! here and never reach the channel manager.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::time;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue, Request};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::domain::foundation::UserId;
use crate::ports::{Credentials, FrameStream, InboundFrame, LiveTransport, TransportError};

/// Configuration for [`WebSocketTransport`].
#[derive(Debug, Clone)]
pub struct WebSocketTransportConfig {
    /// `ws://` or `wss://` origin of the notification service.
    pub base_url: String,

    /// Upper bound on TCP connect plus upgrade handshake.
    pub connect_timeout: Duration,
}

impl WebSocketTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// [`LiveTransport`] over tokio-tungstenite.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    config: WebSocketTransportConfig,
}

impl WebSocketTransport {
    pub fn new(config: WebSocketTransportConfig) -> Self {
        Self { config }
    }

    /// Endpoint URL for one user.
    pub fn endpoint_for(&self, user_id: &UserId) -> String {
        format!(
            "{}/ws/notifications/{}",
            self.config.base_url.trim_end_matches('/'),
            user_id
        )
    }

    fn build_request(
        &self,
        user_id: &UserId,
        credentials: &Credentials,
    ) -> Result<Request<()>, TransportError> {
        let mut request = self
            .endpoint_for(user_id)
            .into_client_request()
            .map_err(|e| TransportError::Connect(format!("invalid endpoint: {}", e)))?;

        if let Some(token) = credentials.bearer_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| TransportError::Unauthorized)?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(request)
    }
}

#[async_trait]
impl LiveTransport for WebSocketTransport {
    async fn connect(
        &self,
        user_id: &UserId,
        credentials: &Credentials,
    ) -> Result<FrameStream, TransportError> {
        let request = self.build_request(user_id, credentials)?;
        tracing::debug!(user_id = %user_id, "Opening notification websocket");

        let connected = time::timeout(
            self.config.connect_timeout,
            tokio_tungstenite::connect_async(request),
        )
        .await
        .map_err(|_| TransportError::Connect("connect timed out".to_string()))?;

        let (socket, _response) = connected.map_err(map_connect_error)?;

        let frames = socket.filter_map(|message| async move {
            match message {
                Ok(message) => frame_from_message(message).map(Ok),
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => None,
                Err(e) => Some(Err(TransportError::Dropped(e.to_string()))),
            }
        });

        Ok(frames.boxed())
    }
}

fn map_connect_error(error: WsError) -> TransportError {
    match error {
        WsError::Http(response) => match response.status().as_u16() {
            401 | 403 => TransportError::Unauthorized,
            code => TransportError::Connect(format!("upgrade rejected with HTTP {}", code)),
        },
        other => TransportError::Connect(other.to_string()),
    }
}

/// Data messages only. Ping/pong are answered by tungstenite itself and a
/// close frame is followed by the end of the stream.
fn frame_from_message(message: Message) -> Option<InboundFrame> {
    match message {
        Message::Text(text) => Some(InboundFrame::Text(text)),
        Message::Binary(bytes) => Some(InboundFrame::Binary(bytes)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

//! WebSocket adapter for the live notification channel.
//!
//! ```text
//! notification service ──ws──► WebSocketTransport ──FrameStream──► ChannelManager
//! ```

mod transport;

pub use transport::{WebSocketTransport, WebSocketTransportConfig};

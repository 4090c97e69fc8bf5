//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the feed to external systems:
//! - `http` - REST history client (reqwest)
//! - `websocket` - live channel transport (tokio-tungstenite)
//! - `auth` - credential providers
//! - `memory` - in-memory doubles for tests and demos

pub mod auth;
pub mod http;
pub mod memory;
pub mod websocket;

pub use auth::StaticCredentialProvider;
pub use http::{HttpHistoryConfig, HttpHistorySource};
pub use memory::{InMemoryHistorySource, InMemoryTransport};
pub use websocket::{WebSocketTransport, WebSocketTransportConfig};

//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the notification feed and the outside world. Adapters implement them.
//!
//! - `HistorySource` - one-shot fetch of persisted notifications
//! - `LiveTransport` - per-user push connection
//! - `NotificationSink` - ingestion entry point for decoded live events
//! - `CredentialProvider` - bearer token and user id, injected at session start

mod credential_provider;
mod history_source;
mod live_transport;
mod notification_sink;

pub use credential_provider::{CredentialProvider, Credentials};
pub use history_source::{HistoryBatch, HistoryError, HistorySource};
pub use live_transport::{FrameStream, InboundFrame, LiveTransport, TransportError};
pub use notification_sink::{NotificationSink, SinkClosed};

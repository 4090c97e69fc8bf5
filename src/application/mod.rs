//! Application layer - session orchestration.
//!
//! - `NotificationStore` - single-owner actor around the feed
//! - `ChannelManager` - live channel lifecycle with reconnects
//! - `NotificationSession` - scoped wiring of both for one user

mod channel_manager;
mod reconnect;
mod session;
mod store;

pub use channel_manager::{ChannelManager, ChannelState};
pub use reconnect::ReconnectPolicy;
pub use session::{HistoryStatus, NotificationSession, SessionSettings, SessionStatus};
pub use store::{NotificationStore, StoreError, StoreHandle, DEFAULT_QUEUE_CAPACITY};

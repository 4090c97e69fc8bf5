//! Notification module - the merge engine behind a user's feed.
//!
//! Two sources feed one view:
//!
//! ```text
//!   history fetch ──seed()──┐
//!                           ▼
//!                   NotificationFeed ──snapshot()──► (ordered feed, unread count)
//!                           ▲
//!   live channel ──ingest()─┘
//! ```
//!
//! Identity is resolved per draft ([`identity`]), conflicting versions of
//! the same id are settled by a total precedence order ([`merge`]) so the
//! final view does not depend on which source arrived first.

mod draft;
mod feed;
pub mod identity;
pub mod merge;
mod notification;

pub use draft::NotificationDraft;
pub use feed::{FeedSnapshot, IngestOutcome, NotificationFeed, SeedReport};
pub use merge::{Source, TimestampOrigin};
pub use notification::Notification;

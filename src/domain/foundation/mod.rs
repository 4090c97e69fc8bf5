//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the notification feed.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DecodeError, ValidationError};
pub use ids::{ConnectionId, NotificationId, UserId, SYNTHESIZED_ID_PREFIX};
pub use timestamp::Timestamp;

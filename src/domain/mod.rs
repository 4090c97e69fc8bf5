//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `notification` - Notification decoding, identity, merge rules and the feed

pub mod foundation;
pub mod notification;

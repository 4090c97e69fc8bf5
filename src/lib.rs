//! Notification Feed - per-user real-time notification subsystem
//!
//! Merges a one-shot history fetch with a live WebSocket channel into one
//! de-duplicated, time-ordered feed with an unread counter.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;

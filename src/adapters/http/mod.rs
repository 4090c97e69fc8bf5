//! HTTP adapters - REST collaborators.

mod history_client;

pub use history_client::{decode_history, HttpHistoryConfig, HttpHistorySource};

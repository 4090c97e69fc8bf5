//! In-memory adapters for tests and local demos.
//!
//! These use `.expect()` on lock operations and panic if a lock is poisoned.
//! They are not meant for production wiring.

mod history;
mod transport;

pub use history::{HistoryGate, InMemoryHistorySource};
pub use transport::{InMemoryTransport, LiveConnection};

//! Strongly-typed identifier value objects.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::ValidationError;

/// Prefix marking ids derived from notification content rather than
/// assigned by the origin system. Origin ids may not use it.
pub const SYNTHESIZED_ID_PREFIX: &str = "syn:";

/// Identifier of the user whose feed is being delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Interprets an optional raw user id, treating absent or blank as "no user".
    pub fn from_optional(id: Option<&str>) -> Option<Self> {
        id.and_then(|raw| Self::new(raw).ok())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a notification, unique within one user's feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Wraps an id assigned by the origin system.
    ///
    /// Rejects blank ids and ids carrying [`SYNTHESIZED_ID_PREFIX`].
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }
        if id.starts_with(SYNTHESIZED_ID_PREFIX) {
            return Err(ValidationError::invalid_format(
                "id",
                format!("prefix '{SYNTHESIZED_ID_PREFIX}' is reserved"),
            ));
        }
        Ok(Self(id))
    }

    /// Builds a synthesized id from a hex content digest.
    pub(crate) fn synthesized(digest_hex: &str) -> Self {
        Self(format!("{SYNTHESIZED_ID_PREFIX}{digest_hex}"))
    }

    /// True when this id was derived from content instead of assigned upstream.
    pub fn is_synthesized(&self) -> bool {
        self.0.starts_with(SYNTHESIZED_ID_PREFIX)
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one physical live-channel connection.
///
/// Generated client-side for every connect attempt so log lines of a
/// reconnect sequence can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

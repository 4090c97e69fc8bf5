//! The notification entity as presented to readers of the feed.

use serde::Serialize;

use crate::domain::foundation::{NotificationId, Timestamp};

/// One entry of a user's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    /// Ordering key. Origin-reported when available, otherwise the time the
    /// event was first observed.
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    pub read: bool,
}

//! Decoding of inbound notification payloads.
//!
//! Live frames and history records share one wire shape. Both the camelCase
//! form and the backend's snake_case form are accepted:
//!
//! | Field             | Aliases                              | Required |
//! |-------------------|--------------------------------------|----------|
//! | `id`              | string or integer                    | no       |
//! | `title`           |                                      | yes      |
//! | `message`         |                                      | yes      |
//! | `category`        | `type`                               | no       |
//! | `relatedEntityId` | `related_entity_id`, `requisition_id` | no       |
//! | `createdAt`       | `created_at`                         | no       |
//! | `read`            | `is_read`                            | no       |

use serde::Deserialize;

use crate::domain::foundation::{DecodeError, NotificationId, Timestamp, ValidationError};

/// A notification as received, before identity resolution and merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Origin-assigned id, if the producer sent one.
    pub id: Option<NotificationId>,
    pub title: String,
    pub message: String,
    pub category: Option<String>,
    pub related_entity_id: Option<String>,
    /// Origin-reported creation time, if present.
    pub created_at: Option<Timestamp>,
    pub read: bool,
}

impl NotificationDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            message: message.into(),
            category: None,
            related_entity_id: None,
            created_at: None,
            read: false,
        }
    }

    pub fn with_id(mut self, id: NotificationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_related_entity_id(mut self, related: impl Into<String>) -> Self {
        self.related_entity_id = Some(related.into());
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Decodes a text frame.
    pub fn from_json_str(raw: &str) -> Result<Self, DecodeError> {
        let wire: WireNotification = serde_json::from_str(raw)?;
        wire.into_draft()
    }

    /// Decodes a binary frame, which must hold UTF-8 JSON.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(raw).map_err(|_| DecodeError::NotUtf8)?;
        Self::from_json_str(text)
    }

    /// Decodes one element of a history response.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let wire: WireNotification = serde_json::from_value(value)?;
        wire.into_draft()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNotification {
    #[serde(default)]
    id: Option<WireId>,
    title: String,
    message: String,
    #[serde(default, alias = "type")]
    category: Option<String>,
    #[serde(default, alias = "related_entity_id", alias = "requisition_id")]
    related_entity_id: Option<WireId>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
    #[serde(default, alias = "is_read")]
    read: Option<bool>,
}

/// Ids arrive as strings from some producers and integers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Signed(n) => n.to_string(),
            WireId::Unsigned(n) => n.to_string(),
        }
    }
}

impl WireNotification {
    fn into_draft(self) -> Result<NotificationDraft, DecodeError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::empty_field("title").into());
        }

        // Blank ids and ids in the synthesized namespace carry no origin
        // identity; fall back to synthesis.
        let id = self
            .id
            .map(WireId::into_string)
            .and_then(|raw| NotificationId::new(raw).ok());

        let created_at = self
            .created_at
            .as_deref()
            .map(Timestamp::parse)
            .transpose()?;

        Ok(NotificationDraft {
            id,
            title: self.title,
            message: self.message,
            category: self.category.filter(|c| !c.is_empty()),
            related_entity_id: self.related_entity_id.map(WireId::into_string),
            created_at,
            read: self.read.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_frame() {
        let raw = r#"{
            "id": "n1",
            "title": "Interview Scheduled",
            "message": "Tomorrow at 10",
            "category": "interview",
            "relatedEntityId": "req-9",
            "createdAt": "2024-01-15T10:30:00Z"
        }"#;

        let draft = NotificationDraft::from_json_str(raw).unwrap();
        assert_eq!(draft.id.unwrap().as_str(), "n1");
        assert_eq!(draft.category.as_deref(), Some("interview"));
        assert_eq!(draft.related_entity_id.as_deref(), Some("req-9"));
        assert!(draft.created_at.is_some());
        assert!(!draft.read);
    }

    #[test]
    fn decodes_backend_snake_case_frame() {
        let raw = r#"{
            "id": 17,
            "title": "Requisition Approval Required: Backend Engineer",
            "message": "Requisition 'Backend Engineer' has been created and requires approval.",
            "requisition_id": 4,
            "type": "approval_request",
            "created_at": "2024-05-01 10:20:30.123456"
        }"#;

        let draft = NotificationDraft::from_json_str(raw).unwrap();
        assert_eq!(draft.id.unwrap().as_str(), "17");
        assert_eq!(draft.related_entity_id.as_deref(), Some("4"));
        assert_eq!(draft.category.as_deref(), Some("approval_request"));
        assert!(draft.created_at.is_some());
    }

    #[test]
    fn id_and_timestamp_are_optional() {
        let draft =
            NotificationDraft::from_json_str(r#"{"title": "Offer sent", "message": "x"}"#).unwrap();
        assert!(draft.id.is_none());
        assert!(draft.created_at.is_none());
    }

    #[test]
    fn null_optionals_decode_as_absent() {
        let raw = r#"{"id": null, "title": "t", "message": "m", "created_at": null, "type": null}"#;
        let draft = NotificationDraft::from_json_str(raw).unwrap();
        assert!(draft.id.is_none());
        assert!(draft.created_at.is_none());
        assert!(draft.category.is_none());
    }

    #[test]
    fn blank_id_is_treated_as_absent() {
        let draft =
            NotificationDraft::from_json_str(r#"{"id": " ", "title": "t", "message": "m"}"#).unwrap();
        assert!(draft.id.is_none());
    }

    #[test]
    fn reserved_prefix_id_is_treated_as_absent() {
        let raw = r#"{"id": "syn:5f1c0e9d", "title": "t", "message": "m"}"#;
        let draft = NotificationDraft::from_json_str(raw).unwrap();
        assert!(draft.id.is_none());
    }

    #[test]
    fn history_read_flag_is_honoured() {
        let value = serde_json::json!({"id": 3, "title": "t", "message": "m", "is_read": true});
        let draft = NotificationDraft::from_json_value(value).unwrap();
        assert!(draft.read);
    }

    #[test]
    fn missing_title_is_rejected() {
        let err = NotificationDraft::from_json_str(r#"{"message": "m"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = NotificationDraft::from_json_str(r#"{"title": "", "message": "m"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Invalid(_)));
    }

    #[test]
    fn unparsable_timestamp_is_rejected() {
        let raw = r#"{"title": "t", "message": "m", "createdAt": "last tuesday"}"#;
        let err = NotificationDraft::from_json_str(raw).unwrap_err();
        assert!(matches!(err, DecodeError::Invalid(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(NotificationDraft::from_json_str("ping").is_err());
        assert!(matches!(
            NotificationDraft::from_json_bytes(&[0xff, 0xfe]),
            Err(DecodeError::NotUtf8)
        ));
    }
}

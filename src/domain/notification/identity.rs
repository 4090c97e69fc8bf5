//! Identity resolution for notifications.
//!
//! The live channel is at-least-once, so a redelivered event must land on
//! the entry it already created. Origin ids are used verbatim; otherwise an
//! id is derived from the fields a redelivery keeps stable: title, message
//! and the reported creation time truncated to whole seconds. Arrival time
//! never participates.

use sha2::{Digest, Sha256};

use crate::domain::foundation::{NotificationId, Timestamp};

use super::{Notification, NotificationDraft};

/// Hex characters kept from the SHA-256 digest.
const SYNTHESIZED_ID_HEX_LEN: usize = 32;

/// Returns the origin id of the draft, or a synthesized one.
pub fn resolve_id(draft: &NotificationDraft) -> NotificationId {
    match &draft.id {
        Some(id) => id.clone(),
        None => synthesize_id(&draft.title, &draft.message, draft.created_at),
    }
}

/// Derives a stable id from notification content.
pub fn synthesize_id(title: &str, message: &str, created_at: Option<Timestamp>) -> NotificationId {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, title.as_bytes());
    update_field(&mut hasher, message.as_bytes());
    match created_at {
        Some(ts) => {
            hasher.update([1u8]);
            hasher.update(ts.as_unix_secs().to_be_bytes());
        }
        None => hasher.update([0u8]),
    }

    let mut digest_hex = hex::encode(hasher.finalize());
    digest_hex.truncate(SYNTHESIZED_ID_HEX_LEN);
    NotificationId::synthesized(&digest_hex)
}

/// Digest over the displayed content of a version.
///
/// `reported_at` is only included when the timestamp came from the origin;
/// an observed arrival time differs between redeliveries and must not make
/// two otherwise identical versions look different.
pub(crate) fn content_digest(notification: &Notification, reported_at: Option<Timestamp>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, notification.title.as_bytes());
    update_field(&mut hasher, notification.message.as_bytes());
    update_optional(&mut hasher, notification.category.as_deref());
    update_optional(&mut hasher, notification.related_entity_id.as_deref());
    if let Some(ts) = reported_at {
        hasher.update(ts.as_unix_millis().to_be_bytes());
    }

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

// Length-prefixed so ("ab", "c") and ("a", "bc") hash differently.
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn update_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            update_field(hasher, v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

//! Precedence between two versions of the same notification.
//!
//! Versions are ranked by a key compared lexicographically:
//!
//! 1. a reported creation time beats an observed one
//! 2. the later reported creation time wins
//! 3. the persisted (history) version beats the live one
//! 4. a content digest settles whatever is left
//!
//! Because the key is a total order, merging is the same as taking the
//! maximum, which is commutative and associative: the surviving version
//! does not depend on the order in which sources delivered it.

use crate::domain::foundation::Timestamp;

use super::identity::content_digest;
use super::Notification;

/// Where a version of a notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// Pushed over the live channel.
    Live,
    /// Returned by the history fetch; treated as canonical.
    History,
}

/// Whether `created_at` was reported by the origin or filled in on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimestampOrigin {
    Observed,
    Reported,
}

/// A candidate version together with its provenance.
#[derive(Debug, Clone, Copy)]
pub struct Version<'a> {
    pub notification: &'a Notification,
    pub source: Source,
    pub origin: TimestampOrigin,
}

type PrecedenceKey = (TimestampOrigin, Option<Timestamp>, Source, [u8; 32]);

impl Version<'_> {
    fn reported_at(&self) -> Option<Timestamp> {
        match self.origin {
            TimestampOrigin::Reported => Some(self.notification.created_at),
            TimestampOrigin::Observed => None,
        }
    }

    fn precedence_key(&self) -> PrecedenceKey {
        let reported_at = self.reported_at();
        (
            self.origin,
            reported_at,
            self.source,
            content_digest(self.notification, reported_at),
        )
    }
}

/// True when `incoming` should replace `existing`.
///
/// Equal keys keep the existing version, so a redelivery is a no-op.
pub fn supersedes(incoming: &Version<'_>, existing: &Version<'_>) -> bool {
    incoming.precedence_key() > existing.precedence_key()
}

//! The in-memory feed of one user.
//!
//! Storage is keyed by id and unordered; presentation order is computed at
//! snapshot time. The unread count is always derived from the entries.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::foundation::{NotificationId, Timestamp};

use super::identity::resolve_id;
use super::merge::{supersedes, Source, TimestampOrigin, Version};
use super::{Notification, NotificationDraft};

/// What a single merge did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new entry was added.
    Inserted,
    /// An existing entry changed (content or read flag).
    Updated,
    /// The draft was already represented; nothing changed.
    Unchanged,
    /// The entry was added but immediately fell outside the retention cap.
    Evicted,
}

/// Summary of a history seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub evicted: usize,
}

impl SeedReport {
    fn record(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Inserted => self.inserted += 1,
            IngestOutcome::Updated => self.updated += 1,
            IngestOutcome::Unchanged => self.unchanged += 1,
            IngestOutcome::Evicted => self.evicted += 1,
        }
    }
}

/// Materialized view handed to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    /// Newest first; equal timestamps keep insertion order.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone)]
struct FeedEntry {
    notification: Notification,
    source: Source,
    origin: TimestampOrigin,
    /// Insertion sequence, kept across updates.
    seq: u64,
}

impl FeedEntry {
    fn version(&self) -> Version<'_> {
        Version {
            notification: &self.notification,
            source: self.source,
            origin: self.origin,
        }
    }

    /// Presentation order: newest first, then first inserted first.
    fn display_cmp(&self, other: &Self) -> Ordering {
        other
            .notification
            .created_at
            .cmp(&self.notification.created_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// De-duplicating, bounded set of notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    entries: HashMap<NotificationId, FeedEntry>,
    next_seq: u64,
    max_entries: Option<usize>,
}

impl NotificationFeed {
    /// Creates an empty feed. `max_entries` caps its length; `None` is unbounded.
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
            max_entries,
        }
    }

    /// Merges a history snapshot into the feed (union by id).
    ///
    /// Entries that arrived live before the snapshot resolved are kept;
    /// matching ids are reconciled by merge precedence.
    pub fn seed<I>(&mut self, drafts: I, received_at: Timestamp) -> SeedReport
    where
        I: IntoIterator<Item = NotificationDraft>,
    {
        let mut report = SeedReport::default();
        for draft in drafts {
            let (id, outcome) = self.apply(draft, Source::History, received_at);
            report.record(self.settle(&id, outcome));
        }
        report
    }

    /// Adds or updates one entry from the live channel.
    pub fn ingest(&mut self, draft: NotificationDraft, received_at: Timestamp) -> IngestOutcome {
        let (id, outcome) = self.apply(draft, Source::Live, received_at);
        self.settle(&id, outcome)
    }

    /// Marks one entry read. Returns false when the id is unknown.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Marks every entry read, returning how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for entry in self.entries.values_mut() {
            if !entry.notification.read {
                entry.notification.read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Returns the ordered feed and its unread count.
    pub fn snapshot(&self) -> FeedSnapshot {
        let mut ordered: Vec<&FeedEntry> = self.entries.values().collect();
        ordered.sort_by(|a, b| a.display_cmp(b));

        FeedSnapshot {
            unread_count: self.unread_count(),
            notifications: ordered
                .into_iter()
                .map(|entry| entry.notification.clone())
                .collect(),
        }
    }

    pub fn unread_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.notification.read)
            .count()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.entries.get(id).map(|entry| &entry.notification)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply(
        &mut self,
        draft: NotificationDraft,
        source: Source,
        received_at: Timestamp,
    ) -> (NotificationId, IngestOutcome) {
        let id = resolve_id(&draft);
        let origin = if draft.created_at.is_some() {
            TimestampOrigin::Reported
        } else {
            TimestampOrigin::Observed
        };

        let candidate = Notification {
            id: id.clone(),
            title: draft.title,
            message: draft.message,
            created_at: draft.created_at.unwrap_or(received_at),
            category: draft.category,
            related_entity_id: draft.related_entity_id,
            read: draft.read,
        };

        let Some(existing) = self.entries.get_mut(&id) else {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.entries.insert(
                id.clone(),
                FeedEntry {
                    notification: candidate,
                    source,
                    origin,
                    seq,
                },
            );
            return (id, IngestOutcome::Inserted);
        };

        // Read is sticky: a redelivery never resurrects a dismissed entry.
        let read = existing.notification.read || candidate.read;
        let incoming = Version {
            notification: &candidate,
            source,
            origin,
        };

        let outcome = if supersedes(&incoming, &existing.version()) {
            let mut winner = candidate;
            winner.read = read;
            // Provenance may change while the visible entry stays identical.
            let changed = winner != existing.notification;
            existing.notification = winner;
            existing.source = source;
            existing.origin = origin;
            if changed {
                IngestOutcome::Updated
            } else {
                IngestOutcome::Unchanged
            }
        } else if read != existing.notification.read {
            existing.notification.read = read;
            IngestOutcome::Updated
        } else {
            IngestOutcome::Unchanged
        };

        (id, outcome)
    }

    /// Applies retention after a merge and reports whether `id` survived it.
    fn settle(&mut self, id: &NotificationId, outcome: IngestOutcome) -> IngestOutcome {
        let evicted = self.enforce_retention();
        if evicted.contains(id) {
            IngestOutcome::Evicted
        } else {
            outcome
        }
    }

    /// Drops entries that sort last until the cap holds.
    fn enforce_retention(&mut self) -> Vec<NotificationId> {
        let Some(max) = self.max_entries else {
            return Vec::new();
        };

        let mut evicted = Vec::new();
        while self.entries.len() > max {
            let oldest = self
                .entries
                .values()
                .max_by(|a, b| a.display_cmp(b))
                .map(|entry| entry.notification.id.clone());

            match oldest {
                Some(id) => {
                    self.entries.remove(&id);
                    evicted.push(id);
                }
                None => break,
            }
        }

        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), max_entries = max, "Evicted notifications past retention cap");
        }
        evicted
    }
}

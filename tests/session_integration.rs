//! Integration tests for a full notification session.
//!
//! Drives `NotificationSession` with in-memory history and transport doubles
//! to check that history and live events converge on one consistent feed
//! regardless of which arrives first.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time;

use notification_feed::adapters::memory::{InMemoryHistorySource, InMemoryTransport, LiveConnection};
use notification_feed::application::{
    ChannelState, HistoryStatus, NotificationSession, ReconnectPolicy, SessionSettings,
};
use notification_feed::domain::foundation::{NotificationId, Timestamp, UserId};
use notification_feed::domain::notification::{FeedSnapshot, NotificationDraft};
use notification_feed::ports::Credentials;

// =============================================================================
// Test Infrastructure
// =============================================================================

const T1: &str = "2024-03-01T09:00:00Z";
const T2: &str = "2024-03-01T09:05:00Z";

fn credentials() -> Credentials {
    Credentials::for_user(UserId::new("42").unwrap()).with_token("jwt")
}

fn settings() -> SessionSettings {
    SessionSettings::default()
        .with_history_timeout(Duration::from_secs(2))
        .with_reconnect(ReconnectPolicy::disabled())
}

fn history_draft(id: &str, title: &str, at: &str) -> NotificationDraft {
    NotificationDraft::new(title, "from history")
        .with_id(NotificationId::new(id).unwrap())
        .with_created_at(Timestamp::parse(at).unwrap())
}

async fn push(conn: &LiveConnection, event: serde_json::Value) {
    assert!(conn.send_text(event.to_string()).await, "client side closed");
}

async fn wait_until(
    session: &NotificationSession,
    pred: impl Fn(&FeedSnapshot) -> bool,
) -> FeedSnapshot {
    let mut updates = session.subscribe();
    let snapshot = time::timeout(Duration::from_secs(2), updates.wait_for(|s| pred(s)))
        .await
        .expect("feed did not reach expected state")
        .expect("store closed")
        .clone();
    snapshot
}

fn ids(snapshot: &FeedSnapshot) -> Vec<&str> {
    snapshot.notifications.iter().map(|n| n.id.as_str()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn redelivered_live_event_is_counted_once_and_can_be_marked_read() {
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();
    let session = NotificationSession::start(
        settings(),
        Arc::new(InMemoryHistorySource::empty()),
        transport,
        credentials(),
    )
    .await;
    assert_eq!(
        session.wait_for_history().await,
        HistoryStatus::Loaded { count: 0, rejected: 0 }
    );

    let event = json!({"id": "n1", "title": "Interview Scheduled", "message": "Tomorrow", "createdAt": T1});
    push(&conn, event.clone()).await;
    push(&conn, event).await;
    // Frames are handled in order, so once the marker is in, so is the redelivery.
    push(&conn, json!({"id": "marker", "title": "Marker", "message": "m", "createdAt": T2})).await;

    let snapshot = wait_until(&session, |s| s.notifications.len() == 2).await;
    assert_eq!(ids(&snapshot), vec!["marker", "n1"]);
    assert_eq!(snapshot.unread_count, 2);

    assert!(session.mark_read(&NotificationId::new("n1").unwrap()).await.unwrap());
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.unread_count, 1);
    assert!(snapshot.notifications[1].read);

    session.stop().await;
}

#[tokio::test]
async fn events_without_ids_collapse_on_redelivery() {
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();
    let session = NotificationSession::start(
        settings(),
        Arc::new(InMemoryHistorySource::empty()),
        transport,
        credentials(),
    )
    .await;

    let event = json!({
        "title": "Candidate applied",
        "message": "Jane applied to Backend Engineer",
        "type": "candidate",
        "requisition_id": 7,
        "created_at": "2024-03-01 09:00:00.250000"
    });
    push(&conn, event.clone()).await;
    push(&conn, event).await;
    push(&conn, json!({"id": "marker", "title": "Marker", "message": "m", "createdAt": T2})).await;

    let snapshot = wait_until(&session, |s| s.notifications.len() == 2).await;
    let synthesized = &snapshot.notifications[1];
    assert!(synthesized.id.is_synthesized());
    assert_eq!(synthesized.category.as_deref(), Some("candidate"));
    assert_eq!(synthesized.related_entity_id.as_deref(), Some("7"));
    assert_eq!(snapshot.unread_count, 2);

    session.stop().await;
}

#[tokio::test]
async fn later_live_version_beats_history_that_resolves_afterwards() {
    let (history, gate) = InMemoryHistorySource::with_drafts(vec![
        history_draft("n1", "Offer drafted", T1),
        history_draft("h2", "Older item", "2024-02-28T12:00:00Z"),
    ])
    .gated();
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();

    let session =
        NotificationSession::start(settings(), Arc::new(history), transport, credentials()).await;

    push(&conn, json!({"id": "n1", "title": "Offer sent", "message": "live", "createdAt": T2})).await;
    wait_until(&session, |s| s.notifications.len() == 1).await;

    gate.release();
    assert_eq!(
        session.wait_for_history().await,
        HistoryStatus::Loaded { count: 2, rejected: 0 }
    );

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(ids(&snapshot), vec!["n1", "h2"]);
    assert_eq!(snapshot.notifications[0].title, "Offer sent");
    assert_eq!(snapshot.unread_count, 2);

    session.stop().await;
}

#[tokio::test]
async fn feed_is_the_same_whichever_source_arrives_first() {
    let history = || {
        vec![
            history_draft("a", "A", "2024-03-01T08:00:00Z"),
            history_draft("b", "B (persisted)", "2024-03-01T08:30:00Z"),
        ]
    };
    let live = [
        json!({"id": "b", "title": "B (live)", "message": "m", "createdAt": "2024-03-01T08:30:00Z"}),
        json!({"id": "c", "title": "C", "message": "m", "createdAt": "2024-03-01T09:00:00Z"}),
    ];

    // History first.
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();
    let history_first = NotificationSession::start(
        settings(),
        Arc::new(InMemoryHistorySource::with_drafts(history())),
        transport,
        credentials(),
    )
    .await;
    history_first.wait_for_history().await;
    for event in &live {
        push(&conn, event.clone()).await;
    }
    let a = wait_until(&history_first, |s| s.notifications.len() == 3).await;

    // Live first.
    let (source, gate) = InMemoryHistorySource::with_drafts(history()).gated();
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();
    let live_first =
        NotificationSession::start(settings(), Arc::new(source), transport, credentials()).await;
    for event in &live {
        push(&conn, event.clone()).await;
    }
    wait_until(&live_first, |s| s.notifications.len() == 2).await;
    gate.release();
    live_first.wait_for_history().await;
    let b = live_first.snapshot().await.unwrap();

    assert_eq!(a, b);
    assert_eq!(ids(&a), vec!["c", "b", "a"]);
    // Equal timestamps: the persisted version is authoritative.
    assert_eq!(a.notifications[1].title, "B (persisted)");

    history_first.stop().await;
    live_first.stop().await;
}

#[tokio::test]
async fn lost_channel_degrades_to_history_only() {
    let transport = Arc::new(InMemoryTransport::new());
    let conn = transport.accept_next();
    let session = NotificationSession::start(
        settings(),
        Arc::new(InMemoryHistorySource::with_drafts(vec![history_draft("a", "A", T1)])),
        transport,
        credentials(),
    )
    .await;
    session.wait_for_history().await;

    let mut channel = session.subscribe_channel();
    drop(conn);
    time::timeout(
        Duration::from_secs(2),
        channel.wait_for(|s| matches!(s, ChannelState::Disconnected { .. })),
    )
    .await
    .unwrap()
    .unwrap();

    let status = session.status();
    assert_eq!(status.history, HistoryStatus::Loaded { count: 1, rejected: 0 });
    assert_eq!(session.snapshot().await.unwrap().notifications.len(), 1);

    session.stop().await;
}

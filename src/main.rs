//! Runs one notification session for the configured user and logs every
//! feed change until Ctrl-C.

use std::error::Error;
use std::sync::Arc;

use notification_feed::adapters::{
    HttpHistorySource, StaticCredentialProvider, WebSocketTransport,
};
use notification_feed::application::{NotificationSession, SessionSettings};
use notification_feed::config::AppConfig;
use notification_feed::logging::init_tracing;
use notification_feed::ports::CredentialProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.runtime)?;

    let history = Arc::new(HttpHistorySource::new(config.history.client_config())?);
    let transport = Arc::new(WebSocketTransport::new(config.channel.transport_config()));
    let provider = StaticCredentialProvider::from_config(&config.credentials);

    let session = NotificationSession::start(
        SessionSettings::from_config(&config),
        history,
        transport,
        provider.credentials().await,
    )
    .await;

    let mut feed = session.subscribe();
    let mut channel = session.subscribe_channel();

    let history = session.wait_for_history().await;
    tracing::info!(status = ?history, "History load settled");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                tracing::info!(
                    entries = snapshot.notifications.len(),
                    unread = snapshot.unread_count,
                    latest = snapshot.notifications.first().map(|n| n.title.as_str()).unwrap_or(""),
                    "Feed updated"
                );
            }
            changed = channel.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = channel.borrow_and_update().clone();
                tracing::info!(state = %state, "Live channel state changed");
            }
        }
    }

    session.stop().await;
    Ok(())
}

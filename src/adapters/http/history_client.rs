//! REST client for the notification history endpoint.
//!
//! `GET {base_url}/notifications` with a bearer token. The response is a JSON
//! array of records; malformed records are dropped one by one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::notification::NotificationDraft;
use crate::ports::{Credentials, HistoryBatch, HistoryError, HistorySource};

/// Configuration for [`HttpHistorySource`].
#[derive(Debug, Clone)]
pub struct HttpHistoryConfig {
    /// Base URL of the REST API (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpHistoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`HistorySource`] backed by the REST API.
pub struct HttpHistorySource {
    config: HttpHistoryConfig,
    client: Client,
}

impl HttpHistorySource {
    pub fn new(config: HttpHistoryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn notifications_url(&self) -> String {
        format!("{}/notifications", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl HistorySource for HttpHistorySource {
    async fn fetch(&self, credentials: &Credentials) -> Result<HistoryBatch, HistoryError> {
        let Some(token) = credentials.bearer_token() else {
            return Err(HistoryError::Unauthorized);
        };

        let response = self
            .client
            .get(self.notifications_url())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HistoryError::Unavailable(format!(
                        "request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    HistoryError::Unavailable(format!("Connection failed: {}", e))
                } else {
                    HistoryError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(HistoryError::Unauthorized)
            }
            s if !s.is_success() => {
                return Err(HistoryError::Unavailable(format!("Unexpected status {}", s)))
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| HistoryError::Malformed(e.to_string()))?;

        decode_history(body)
    }
}

/// Splits a history response into usable drafts and a count of rejects.
pub fn decode_history(body: Value) -> Result<HistoryBatch, HistoryError> {
    let Value::Array(records) = body else {
        return Err(HistoryError::Malformed("expected a JSON array".to_string()));
    };

    let mut batch = HistoryBatch::default();
    for (index, record) in records.into_iter().enumerate() {
        match NotificationDraft::from_json_value(record) {
            Ok(draft) => batch.drafts.push(draft),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping malformed history record");
                batch.rejected += 1;
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_keeps_good_records_and_counts_bad_ones() {
        let body = json!([
            {"id": 1, "title": "Offer", "message": "m", "created_at": "2024-03-01 09:30:00"},
            {"message": "no title"},
            {"id": "x", "title": "Bad time", "message": "m", "createdAt": "yesterday"},
            {"id": "2", "title": "Interview", "message": "m", "createdAt": "2024-03-01T10:00:00Z"}
        ]);

        let batch = decode_history(body).unwrap();

        assert_eq!(batch.drafts.len(), 2);
        assert_eq!(batch.rejected, 2);
        assert_eq!(batch.drafts[0].id.as_ref().unwrap().as_str(), "1");
    }

    #[test]
    fn decode_rejects_non_array_body() {
        let err = decode_history(json!({"detail": "oops"})).unwrap_err();
        assert!(matches!(err, HistoryError::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        // Nothing listens on this port; the request must never be sent.
        let source = HttpHistorySource::new(HttpHistoryConfig::new("http://127.0.0.1:9")).unwrap();

        let err = source.fetch(&Credentials::default()).await.unwrap_err();

        assert_eq!(err, HistoryError::Unauthorized);
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let source = HttpHistorySource::new(HttpHistoryConfig::new("http://api/")).unwrap();
        assert_eq!(source.notifications_url(), "http://api/notifications");
    }
}

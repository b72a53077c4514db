//! Feed store client (collections + activity feeds)
//!
//! Two operations: upsert a full record into an object collection
//! (idempotent by id), and append an activity to a feed addressed by
//! `(group, id)`. Duplicate/conflict responses on append are success:
//! re-running ingestion over an already-published date must not
//! generate errors or duplicate feed entries.

use crate::error::{IngestError, IngestResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Result of one activity append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Created,
    /// The feed already holds an activity with this foreign id
    Duplicate,
}

/// Feed store seam consumed by the publisher
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Upsert a record keyed by id; re-publishing overwrites
    async fn upsert_object(&self, collection: &str, id: &str, data: &Value) -> IngestResult<()>;

    /// Append an activity to one feed; duplicates are not an error
    async fn add_activity(
        &self,
        group: &str,
        feed_id: &str,
        activity: &Value,
    ) -> IngestResult<AppendOutcome>;
}

/// Production feed store client
pub struct HttpFeedClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> IngestResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::FeedStore(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            http_client,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.http_client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("api_key", key.as_str())]);
        }
        builder
    }
}

/// Duplicate detection on the append response: a 409, or an error body
/// mentioning a duplicate foreign id.
fn is_duplicate(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::CONFLICT || body.to_lowercase().contains("duplicate")
}

#[async_trait]
impl FeedStore for HttpFeedClient {
    async fn upsert_object(&self, collection: &str, id: &str, data: &Value) -> IngestResult<()> {
        let url = format!("{}/collections/{}/{}", self.base_url, collection, id);

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await
            .map_err(|e| IngestError::FeedStore(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::FeedStore(format!(
                "upsert {}/{} returned {}: {}",
                collection,
                id,
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }

    async fn add_activity(
        &self,
        group: &str,
        feed_id: &str,
        activity: &Value,
    ) -> IngestResult<AppendOutcome> {
        let url = format!("{}/feed/{}/{}/", self.base_url, group, feed_id);

        let response = self
            .request(reqwest::Method::POST, url)
            .json(activity)
            .send()
            .await
            .map_err(|e| IngestError::FeedStore(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(AppendOutcome::Created);
        }

        let body = response.text().await.unwrap_or_default();
        if is_duplicate(status, &body) {
            tracing::debug!(group = %group, feed = %feed_id, "Duplicate activity, skipping");
            return Ok(AppendOutcome::Duplicate);
        }

        Err(IngestError::FeedStore(format!(
            "append to {}:{} returned {}: {}",
            group,
            feed_id,
            status.as_u16(),
            body
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_status_is_duplicate() {
        assert!(is_duplicate(reqwest::StatusCode::CONFLICT, ""));
    }

    #[test]
    fn duplicate_body_is_duplicate() {
        assert!(is_duplicate(
            reqwest::StatusCode::BAD_REQUEST,
            "{\"detail\": \"Duplicate foreign_id goal:1_2\"}"
        ));
    }

    #[test]
    fn other_failures_are_not_duplicates() {
        assert!(!is_duplicate(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "upstream exploded"
        ));
    }
}

//! JSON blob store client
//!
//! The checkpoint, archived run summaries, and the startup status
//! record all live in a key/value blob store addressed by string key.
//! Reads of missing keys are a normal condition (`Ok(None)`), writes
//! are full-document replacement.

use crate::error::{IngestError, IngestResult};
use crate::models::Checkpoint;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Blob store seam: string key → JSON document
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a JSON document; `Ok(None)` when the key does not exist
    async fn read_json(&self, key: &str) -> IngestResult<Option<Value>>;

    /// Write (replace) a JSON document
    async fn write_json(&self, key: &str, value: &Value) -> IngestResult<()>;
}

/// Typed helpers layered over the raw key/value contract
pub struct CheckpointStore<'a, B: BlobStore + ?Sized> {
    store: &'a B,
    key: &'a str,
}

impl<'a, B: BlobStore + ?Sized> CheckpointStore<'a, B> {
    pub fn new(store: &'a B, key: &'a str) -> Self {
        Self { store, key }
    }

    /// Load the checkpoint, initializing empty state on first run.
    ///
    /// A malformed stored document is surfaced as an error rather than
    /// silently replaced; losing the completed-dates set would
    /// re-publish the entire history.
    pub async fn load(&self) -> IngestResult<Checkpoint> {
        match self.store.read_json(self.key).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| IngestError::BlobStore(format!("checkpoint decode: {}", e))),
            None => {
                tracing::info!(key = %self.key, "No checkpoint found, starting fresh");
                Ok(Checkpoint::new())
            }
        }
    }

    pub async fn save(&self, checkpoint: &Checkpoint) -> IngestResult<()> {
        let value = serde_json::to_value(checkpoint)
            .map_err(|e| IngestError::BlobStore(format!("checkpoint encode: {}", e)))?;
        self.store.write_json(self.key, &value).await
    }
}

/// Production blob store client (HTTP PUT/GET of JSON documents)
pub struct HttpBlobStore {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> IngestResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::BlobStore(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            http_client,
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn read_json(&self, key: &str) -> IngestResult<Option<Value>> {
        let url = self.url(key);
        tracing::debug!(key = %key, "Reading blob");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::BlobStore(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(key = %key, "Blob not found");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::BlobStore(format!(
                "read {} returned {}: {}",
                key,
                status.as_u16(),
                body
            )));
        }

        let value = response
            .json()
            .await
            .map_err(|e| IngestError::BlobStore(format!("decode {}: {}", key, e)))?;
        Ok(Some(value))
    }

    async fn write_json(&self, key: &str, value: &Value) -> IngestResult<()> {
        let url = self.url(key);
        tracing::debug!(key = %key, "Writing blob");

        let response = self
            .http_client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(value)
            .send()
            .await
            .map_err(|e| IngestError::BlobStore(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::BlobStore(format!(
                "write {} returned {}: {}",
                key,
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }
}

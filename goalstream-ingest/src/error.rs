//! Error types for goalstream-ingest

use thiserror::Error;

/// Ingestion error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Event-source fetch failed (schedule, play-by-play, media)
    #[error("Event source error: {0}")]
    EventSource(String),

    /// Blob store read/write failed
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Feed store call failed (non-duplicate)
    #[error("Feed store error: {0}")]
    FeedStore(String),

    /// Malformed play record or response shape
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Invalid date range or argument
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

//! External collaborator clients
//!
//! Each collaborator is consumed through a narrow trait so the
//! orchestrator can be exercised with fakes; the production
//! implementations are thin reqwest clients.

pub mod blob_store;
pub mod event_source;
pub mod feed_store;

pub use blob_store::{BlobStore, CheckpointStore, HttpBlobStore};
pub use event_source::{
    EventSource, GameState, NhlApiClient, Play, PlayByPlay, PlayDetails, RosterSpot, ScheduleDay,
    ScheduledGame, ScheduledTeam,
};
pub use feed_store::{AppendOutcome, FeedStore, HttpFeedClient};

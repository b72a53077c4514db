//! Data models for goalstream-ingest
//!
//! - Reconstructed scoring events and their classification outputs
//! - Per-date ingestion checkpoint
//! - Run summaries returned to the trigger surface

pub mod checkpoint;
pub mod classification;
pub mod goal_event;
pub mod run_summary;

pub use checkpoint::{Checkpoint, DateStatus, IngestStats};
pub use classification::GoalClassification;
pub use goal_event::{
    Assist, AssistKind, GoalEvent, GoalModifier, MediaRefs, PeriodType, PlayerRef, ShotDetails,
    Strength, TeamRef,
};
pub use run_summary::{DateDetail, DateOutcome, RunSummary};

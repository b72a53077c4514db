//! Startup catch-up check
//!
//! On service start the recent window is re-checked in the background
//! so games that finished while the service was down are picked up.
//! A status record and a bounded run history are persisted to the blob
//! store for operator visibility; both are best effort and never fail
//! the check itself.

use crate::error::IngestResult;
use crate::models::RunSummary;
use crate::pipeline::Orchestrator;
use crate::services::blob_store::BlobStore;
use crate::services::event_source::EventSource;
use crate::services::feed_store::FeedStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const STATUS_KEY: &str = "startup_status.json";
const HISTORY_KEY: &str = "startup_history.json";
const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupState {
    Running,
    Completed,
    Failed,
}

/// Persisted record of one startup check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupStatus {
    pub state: StartupState,
    pub days_back: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dates_checked: usize,
    pub goals_found: usize,
    pub goals_published: usize,
    pub error: Option<String>,
}

impl StartupStatus {
    fn running(days_back: u32) -> Self {
        Self {
            state: StartupState::Running,
            days_back,
            started_at: Utc::now(),
            finished_at: None,
            dates_checked: 0,
            goals_found: 0,
            goals_published: 0,
            error: None,
        }
    }

    fn completed(mut self, summary: &RunSummary) -> Self {
        self.state = StartupState::Completed;
        self.finished_at = Some(Utc::now());
        self.dates_checked = summary.dates_checked;
        self.goals_found = summary.goals_found;
        self.goals_published = summary.goals_published;
        self
    }

    fn failed(mut self, error: String) -> Self {
        self.state = StartupState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
        self
    }
}

/// Run the startup check, recording status before and after.
pub async fn run_startup_check<S, B, F>(
    orchestrator: &Orchestrator<S, B, F>,
    days_back: u32,
) -> IngestResult<RunSummary>
where
    S: EventSource,
    B: BlobStore,
    F: FeedStore,
{
    let status = StartupStatus::running(days_back);
    write_status(orchestrator.blobs(), &status).await;

    info!(days_back, "Startup check beginning");
    match orchestrator.check_recent(days_back, false).await {
        Ok(summary) => {
            let status = status.completed(&summary);
            write_status(orchestrator.blobs(), &status).await;
            append_history(orchestrator.blobs(), status).await;
            info!(
                dates_checked = summary.dates_checked,
                goals_published = summary.goals_published,
                "Startup check finished"
            );
            Ok(summary)
        }
        Err(e) => {
            let status = status.failed(e.to_string());
            write_status(orchestrator.blobs(), &status).await;
            append_history(orchestrator.blobs(), status).await;
            Err(e)
        }
    }
}

/// Spawn the startup check as a background task so service startup is
/// not blocked on the catch-up run.
pub fn spawn_startup_check<S, B, F>(
    orchestrator: Orchestrator<S, B, F>,
    days_back: u32,
) -> JoinHandle<()>
where
    S: EventSource + 'static,
    B: BlobStore + 'static,
    F: FeedStore + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = run_startup_check(&orchestrator, days_back).await {
            error!(error = %e, "Startup check failed");
        }
    })
}

async fn write_status<B: BlobStore + ?Sized>(blobs: &B, status: &StartupStatus) {
    let value = match serde_json::to_value(status) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Startup status serialization failed");
            return;
        }
    };
    if let Err(e) = blobs.write_json(STATUS_KEY, &value).await {
        warn!(error = %e, "Startup status write failed");
    }
}

/// Prepend the finished record to the bounded history list.
async fn append_history<B: BlobStore + ?Sized>(blobs: &B, status: StartupStatus) {
    let mut history: Vec<StartupStatus> = match blobs.read_json(HISTORY_KEY).await {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_default(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Startup history read failed");
            return;
        }
    };

    history.insert(0, status);
    history.truncate(HISTORY_LIMIT);

    let value = match serde_json::to_value(&history) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Startup history serialization failed");
            return;
        }
    };
    if let Err(e) = blobs.write_json(HISTORY_KEY, &value).await {
        warn!(error = %e, "Startup history write failed");
    }
}

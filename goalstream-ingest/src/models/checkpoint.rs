//! Per-date ingestion checkpoint
//!
//! Persisted to the blob store after every processed date so re-runs
//! are incremental and a crash mid-run loses at most one date's
//! progress. Invariant: a date belongs to at most one of
//! {completed, in_progress, failed} at any time; every transition
//! method removes the date from the other two sets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status of one date within the checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Completed,
    InProgress,
    Failed,
    Untracked,
}

/// Aggregate ingestion counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub total_goals: u64,
}

/// Process-wide persisted ingestion state, keyed by date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub in_progress_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub failed_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub stats: IngestStats,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a date fully ingested (all games finished)
    pub fn mark_completed(&mut self, date: NaiveDate) {
        self.in_progress_dates.remove(&date);
        self.failed_dates.remove(&date);
        self.completed_dates.insert(date);
    }

    /// Mark a date partially ingested (games still live or upcoming)
    pub fn mark_in_progress(&mut self, date: NaiveDate) {
        // A completed date never regresses to in-progress
        if self.completed_dates.contains(&date) {
            return;
        }
        self.failed_dates.remove(&date);
        self.in_progress_dates.insert(date);
    }

    /// Mark a date as failed; it will be retried on the next run
    pub fn mark_failed(&mut self, date: NaiveDate) {
        if self.completed_dates.contains(&date) {
            return;
        }
        self.in_progress_dates.remove(&date);
        self.failed_dates.insert(date);
    }

    /// Operator reset: forget one date entirely so it is re-ingested
    pub fn reset_date(&mut self, date: NaiveDate) {
        self.completed_dates.remove(&date);
        self.in_progress_dates.remove(&date);
        self.failed_dates.remove(&date);
    }

    pub fn status(&self, date: NaiveDate) -> DateStatus {
        if self.completed_dates.contains(&date) {
            DateStatus::Completed
        } else if self.in_progress_dates.contains(&date) {
            DateStatus::InProgress
        } else if self.failed_dates.contains(&date) {
            DateStatus::Failed
        } else {
            DateStatus::Untracked
        }
    }

    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    /// Most recent completed date, if any (drives catch-up runs)
    pub fn last_completed_date(&self) -> Option<NaiveDate> {
        self.completed_dates.iter().next_back().copied()
    }

    pub fn add_goals(&mut self, count: u64) {
        self.stats.total_goals += count;
    }

    pub fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    /// Invariant check: no date appears in more than one set
    pub fn sets_are_disjoint(&self) -> bool {
        self.completed_dates.is_disjoint(&self.in_progress_dates)
            && self.completed_dates.is_disjoint(&self.failed_dates)
            && self.in_progress_dates.is_disjoint(&self.failed_dates)
    }
}

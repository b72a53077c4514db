//! Run summaries returned to the trigger surface
//!
//! One `RunSummary` per orchestrator run, with a per-date detail
//! record for every candidate date. The summary is also archived to
//! the blob store under a timestamped key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome for a single candidate date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOutcome {
    /// All games finished; date moved to `completed`
    Completed,
    /// Games still live or upcoming; date stays revisitable
    InProgress,
    /// Date-level error; date moved to `failed`, run continued
    Failed,
    /// Already completed and `force_refresh` not set
    Skipped,
}

/// Per-date detail record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateDetail {
    pub date: NaiveDate,
    pub outcome: DateOutcome,
    pub goals_found: usize,
    pub goals_published: usize,
    pub duplicates_skipped: usize,
    pub publish_failures: usize,
    pub total_games: usize,
    pub finished_games: usize,
    pub live_games: usize,
    pub future_games: usize,
    /// Games whose play-by-play fetch failed on this pass
    pub game_errors: usize,
    /// Error message when `outcome == Failed`
    pub error: Option<String>,
}

impl DateDetail {
    pub fn skipped(date: NaiveDate) -> Self {
        Self {
            date,
            outcome: DateOutcome::Skipped,
            goals_found: 0,
            goals_published: 0,
            duplicates_skipped: 0,
            publish_failures: 0,
            total_games: 0,
            finished_games: 0,
            live_games: 0,
            future_games: 0,
            game_errors: 0,
            error: None,
        }
    }

    pub fn failed(date: NaiveDate, error: String) -> Self {
        Self {
            error: Some(error),
            outcome: DateOutcome::Failed,
            ..Self::skipped(date)
        }
    }
}

/// Summary of one orchestrator run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub dates_checked: usize,
    pub goals_found: usize,
    pub goals_published: usize,
    pub duplicates_skipped: usize,
    pub publish_failures: usize,
    pub dates_completed: usize,
    pub dates_in_progress: usize,
    pub dates_failed: usize,
    pub details: Vec<DateDetail>,
}

impl RunSummary {
    /// Fold one date's detail into the aggregate counters
    pub fn record(&mut self, detail: DateDetail) {
        match detail.outcome {
            DateOutcome::Completed => {
                self.dates_checked += 1;
                self.dates_completed += 1;
            }
            DateOutcome::InProgress => {
                self.dates_checked += 1;
                self.dates_in_progress += 1;
            }
            DateOutcome::Failed => {
                self.dates_checked += 1;
                self.dates_failed += 1;
            }
            DateOutcome::Skipped => {}
        }
        self.goals_found += detail.goals_found;
        self.goals_published += detail.goals_published;
        self.duplicates_skipped += detail.duplicates_skipped;
        self.publish_failures += detail.publish_failures;
        self.details.push(detail);
    }
}

//! Run orchestration
//!
//! Drives the pipeline over an inclusive date range, oldest first.
//! Owns the checkpoint: each date is processed, its status recorded,
//! and the checkpoint persisted before the next date starts, so an
//! interrupted run loses at most the date in flight. Date-level
//! failures are recorded and the run continues; only an unreadable
//! checkpoint aborts the run, because processing without it would
//! re-publish the entire history.

use crate::error::{IngestError, IngestResult};
use crate::models::{Checkpoint, DateDetail, DateOutcome, RunSummary};
use crate::pipeline::{classify_goals, reconstruct_goals, Publisher};
use crate::services::blob_store::{BlobStore, CheckpointStore};
use crate::services::event_source::EventSource;
use crate::services::feed_store::FeedStore;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use goalstream_common::IngestConfig;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Drives ingestion runs over the three collaborator seams
pub struct Orchestrator<S: EventSource, B: BlobStore, F: FeedStore> {
    source: S,
    blobs: B,
    feeds: F,
    config: IngestConfig,
    cancel: CancellationToken,
}

impl<S: EventSource, B: BlobStore, F: FeedStore> Orchestrator<S, B, F> {
    pub fn new(source: S, blobs: B, feeds: F, config: IngestConfig) -> Self {
        Self {
            source,
            blobs,
            feeds,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach an external cancellation token; the run stops cleanly at
    /// the next date boundary after cancellation.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Process an explicit inclusive date range.
    pub async fn run_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        force_refresh: bool,
    ) -> IngestResult<RunSummary> {
        if start > end {
            return Err(IngestError::InvalidRequest(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        self.run_dates(dates_between(start, end), force_refresh).await
    }

    /// Catch-up run: from the day after the last completed date through
    /// today. With no prior progress, starts from yesterday.
    pub async fn run_to_today(&self) -> IngestResult<RunSummary> {
        let today = Utc::now().date_naive();
        let checkpoint = self.checkpoint_store().load().await?;

        let start = match checkpoint.last_completed_date() {
            Some(last) => last + ChronoDuration::days(1),
            None => today - ChronoDuration::days(1),
        };

        if start > today {
            info!("Checkpoint is current through {}", today);
            return Ok(RunSummary::default());
        }

        info!(start = %start, end = %today, "Starting catch-up run");
        self.run_dates(dates_between(start, today), false).await
    }

    /// Re-check the recent window: the last `days_back` days through
    /// today, oldest first. Used at startup and for on-demand checks,
    /// picking up late score corrections and games that were still
    /// live on the previous pass.
    pub async fn check_recent(
        &self,
        days_back: u32,
        force_refresh: bool,
    ) -> IngestResult<RunSummary> {
        let today = Utc::now().date_naive();
        let start = today - ChronoDuration::days(days_back as i64);

        info!(start = %start, end = %today, force_refresh, "Checking recent window");
        self.run_dates(dates_between(start, today), force_refresh).await
    }

    /// The underlying blob store, for callers that persist their own
    /// records alongside the checkpoint (startup status, history).
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    fn checkpoint_store(&self) -> CheckpointStore<'_, B> {
        CheckpointStore::new(&self.blobs, &self.config.checkpoint_key)
    }

    async fn run_dates(
        &self,
        dates: Vec<NaiveDate>,
        force_refresh: bool,
    ) -> IngestResult<RunSummary> {
        let checkpoint_store = self.checkpoint_store();
        let mut checkpoint = checkpoint_store.load().await?;
        let mut summary = RunSummary::default();

        let total = dates.len();
        for (index, date) in dates.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(date = %date, "Run cancelled, stopping at date boundary");
                break;
            }

            if checkpoint.is_completed(date) && !force_refresh {
                info!(date = %date, "Date already completed, skipping");
                summary.record(DateDetail::skipped(date));
                continue;
            }

            let detail = self.process_date(&mut checkpoint, date).await;

            checkpoint.add_goals(detail.goals_published as u64);
            checkpoint.touch();
            if let Err(e) = checkpoint_store.save(&checkpoint).await {
                // Progress for this date is lost on restart, nothing worse
                warn!(date = %date, error = %e, "Checkpoint save failed");
            }

            summary.record(detail);

            if index + 1 < total {
                tokio::time::sleep(self.config.inter_date_delay).await;
            }
        }

        self.archive_summary(&summary).await;
        Ok(summary)
    }

    /// Process one date end to end and update the checkpoint sets.
    async fn process_date(&self, checkpoint: &mut Checkpoint, date: NaiveDate) -> DateDetail {
        let schedule = match self.source.schedule(date).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(date = %date, error = %e, "Schedule fetch failed");
                checkpoint.mark_failed(date);
                return DateDetail::failed(date, e.to_string());
            }
        };

        info!(
            date = %date,
            games = schedule.games.len(),
            finished = schedule.finished_games(),
            "Processing date"
        );

        let publisher = Publisher::new(
            &self.feeds,
            &self.config.collection,
            &self.config.feed_group,
            &self.config.central_feed_id,
            self.config.publish_delay,
        );

        let mut goals_found = 0;
        let mut goals_published = 0;
        let mut duplicates_skipped = 0;
        let mut publish_failures = 0;
        let mut game_errors = 0;

        let started_games: Vec<_> = schedule
            .games
            .iter()
            .filter(|g| g.game_state.is_terminal() || g.game_state.is_live())
            .collect();

        let game_count = started_games.len();
        for (index, game) in started_games.into_iter().enumerate() {
            let play_by_play = match self.source.play_by_play(game.id).await {
                Ok(pbp) => pbp,
                Err(e) => {
                    // One broken game must not sink the date
                    warn!(game_id = game.id, error = %e, "Play-by-play fetch failed");
                    game_errors += 1;
                    continue;
                }
            };

            let goals = reconstruct_goals(&self.source, game, &play_by_play).await;
            goals_found += goals.len();

            if !goals.is_empty() {
                let items = classify_goals(goals);
                let stats = publisher.publish_all(&items).await;
                goals_published += stats.uploaded;
                duplicates_skipped += stats.duplicates;
                publish_failures += stats.failed;
            }

            if index + 1 < game_count {
                tokio::time::sleep(self.config.per_game_delay).await;
            }
        }

        // Completion tracks source consumption, not publish success: a
        // date whose games were all fetched and are all final is done
        // even if some publishes failed. A fetch error means goals may
        // be missing, so the date stays retryable.
        let mut error = None;
        let outcome = if game_errors > 0 {
            checkpoint.mark_failed(date);
            error = Some(format!("{} of {} games failed to fetch", game_errors, game_count));
            DateOutcome::Failed
        } else if schedule.all_finished() {
            checkpoint.mark_completed(date);
            DateOutcome::Completed
        } else {
            checkpoint.mark_in_progress(date);
            DateOutcome::InProgress
        };

        info!(
            date = %date,
            ?outcome,
            goals_found,
            goals_published,
            duplicates_skipped,
            publish_failures,
            "Date processed"
        );

        DateDetail {
            date,
            outcome,
            goals_found,
            goals_published,
            duplicates_skipped,
            publish_failures,
            total_games: schedule.games.len(),
            finished_games: schedule.finished_games(),
            live_games: schedule.live_games(),
            future_games: schedule.future_games(),
            game_errors,
            error,
        }
    }

    /// Operator reset: forget one date's checkpoint status so the next
    /// run re-ingests it from scratch.
    pub async fn reset_date(&self, date: NaiveDate) -> IngestResult<()> {
        let checkpoint_store = self.checkpoint_store();
        let mut checkpoint = checkpoint_store.load().await?;
        checkpoint.reset_date(date);
        checkpoint.touch();
        checkpoint_store.save(&checkpoint).await?;
        info!(date = %date, "Checkpoint reset for date");
        Ok(())
    }

    /// Archive the run summary under a timestamped blob key.
    async fn archive_summary(&self, summary: &RunSummary) {
        let key = format!(
            "run_summary_{}.json",
            Utc::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let value = match serde_json::to_value(summary) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Run summary serialization failed");
                return;
            }
        };
        if let Err(e) = self.blobs.write_json(&key, &value).await {
            warn!(key = %key, error = %e, "Run summary archive failed");
        }
    }
}

/// Inclusive list of dates from `start` through `end`, ascending
fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaRefs;
    use crate::services::event_source::{PlayByPlay, ScheduleDay};
    use crate::services::feed_store::AppendOutcome;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn dates_between_is_inclusive_and_ascending() {
        let dates = dates_between(d("2024-11-01"), d("2024-11-03"));
        assert_eq!(dates, vec![d("2024-11-01"), d("2024-11-02"), d("2024-11-03")]);

        let single = dates_between(d("2024-11-01"), d("2024-11-01"));
        assert_eq!(single, vec![d("2024-11-01")]);
    }

    struct NoopSource;

    #[async_trait]
    impl EventSource for NoopSource {
        async fn schedule(&self, date: NaiveDate) -> IngestResult<ScheduleDay> {
            Ok(ScheduleDay { date, games: vec![] })
        }

        async fn play_by_play(&self, _game_id: i64) -> IngestResult<PlayByPlay> {
            unimplemented!("no games scheduled")
        }

        async fn landing_media(&self, _game_id: i64) -> IngestResult<HashMap<i64, MediaRefs>> {
            unimplemented!("no games scheduled")
        }
    }

    struct NoopBlobStore;

    #[async_trait]
    impl BlobStore for NoopBlobStore {
        async fn read_json(&self, _key: &str) -> IngestResult<Option<Value>> {
            Ok(None)
        }

        async fn write_json(&self, _key: &str, _value: &Value) -> IngestResult<()> {
            Ok(())
        }
    }

    struct NoopFeedStore;

    #[async_trait]
    impl FeedStore for NoopFeedStore {
        async fn upsert_object(
            &self,
            _collection: &str,
            _id: &str,
            _data: &Value,
        ) -> IngestResult<()> {
            Ok(())
        }

        async fn add_activity(
            &self,
            _group: &str,
            _feed_id: &str,
            _activity: &Value,
        ) -> IngestResult<AppendOutcome> {
            Ok(AppendOutcome::Created)
        }
    }

    fn orchestrator() -> Orchestrator<NoopSource, NoopBlobStore, NoopFeedStore> {
        let mut config = IngestConfig::default();
        config.inter_date_delay = std::time::Duration::ZERO;
        Orchestrator::new(NoopSource, NoopBlobStore, NoopFeedStore, config)
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let result = orchestrator()
            .run_range(d("2024-11-03"), d("2024-11-01"), false)
            .await;
        assert!(matches!(result, Err(IngestError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn empty_schedule_completes_the_date() {
        let summary = orchestrator()
            .run_range(d("2024-11-01"), d("2024-11-02"), false)
            .await
            .unwrap();
        assert_eq!(summary.dates_checked, 2);
        assert_eq!(summary.dates_completed, 2);
        assert_eq!(summary.goals_found, 0);
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_any_date() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = orchestrator()
            .with_cancellation(cancel)
            .run_range(d("2024-11-01"), d("2024-11-05"), false)
            .await
            .unwrap();
        assert_eq!(summary.dates_checked, 0);
    }
}

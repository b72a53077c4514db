//! Publication
//!
//! Upserts a durable record per event into the object collection
//! (idempotent by composite goal id) and appends the event to the
//! scoring team's feed plus the global feed. Duplicate appends are
//! success: re-running an already-published date must be a no-op.
//! Other failures are counted and surfaced, never fatal to the run.

use crate::error::IngestResult;
use crate::models::{AssistKind, GoalClassification, GoalEvent};
use crate::services::feed_store::{AppendOutcome, FeedStore};
use serde_json::{json, Value};
use std::time::Duration;

/// Outcome of publishing one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Uploaded,
    DuplicateSkipped,
    Failed,
}

/// Aggregate publish counters for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub uploaded: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Publishes classified events to the feed store
pub struct Publisher<'a, F: FeedStore + ?Sized> {
    feeds: &'a F,
    collection: &'a str,
    feed_group: &'a str,
    central_feed_id: &'a str,
    publish_delay: Duration,
}

impl<'a, F: FeedStore + ?Sized> Publisher<'a, F> {
    pub fn new(
        feeds: &'a F,
        collection: &'a str,
        feed_group: &'a str,
        central_feed_id: &'a str,
        publish_delay: Duration,
    ) -> Self {
        Self {
            feeds,
            collection,
            feed_group,
            central_feed_id,
            publish_delay,
        }
    }

    /// Publish a batch sequentially with the configured inter-publish
    /// delay. Per-event failures are counted and skipped.
    pub async fn publish_all(&self, items: &[(GoalEvent, GoalClassification)]) -> PublishStats {
        let mut stats = PublishStats::default();

        for (index, (event, classification)) in items.iter().enumerate() {
            match self.publish_one(event, classification).await {
                Ok(PublishOutcome::Uploaded) => stats.uploaded += 1,
                Ok(PublishOutcome::DuplicateSkipped) => stats.duplicates += 1,
                Ok(PublishOutcome::Failed) | Err(_) => stats.failed += 1,
            }

            if index + 1 < items.len() {
                tokio::time::sleep(self.publish_delay).await;
            }
        }

        stats
    }

    /// Publish one event: collection upsert, then both feed appends.
    pub async fn publish_one(
        &self,
        event: &GoalEvent,
        classification: &GoalClassification,
    ) -> IngestResult<PublishOutcome> {
        let record = goal_record(event, classification)?;
        if let Err(e) = self
            .feeds
            .upsert_object(self.collection, &event.goal_id, &record)
            .await
        {
            tracing::warn!(goal_id = %event.goal_id, error = %e, "Collection upsert failed");
            return Ok(PublishOutcome::Failed);
        }

        let activity = activity_record(event, classification);

        let team_outcome = match self
            .feeds
            .add_activity(self.feed_group, &event.scoring_team.abbrev, &activity)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(goal_id = %event.goal_id, error = %e, "Team feed append failed");
                return Ok(PublishOutcome::Failed);
            }
        };

        let central_outcome = match self
            .feeds
            .add_activity(self.feed_group, self.central_feed_id, &activity)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(goal_id = %event.goal_id, error = %e, "Central feed append failed");
                return Ok(PublishOutcome::Failed);
            }
        };

        if team_outcome == AppendOutcome::Duplicate && central_outcome == AppendOutcome::Duplicate {
            Ok(PublishOutcome::DuplicateSkipped)
        } else {
            Ok(PublishOutcome::Uploaded)
        }
    }
}

/// Full durable record for the collection upsert: the canonical event
/// plus its classification outputs.
pub fn goal_record(
    event: &GoalEvent,
    classification: &GoalClassification,
) -> IngestResult<Value> {
    let mut record = serde_json::to_value(event)
        .map_err(|e| crate::error::IngestError::MalformedRecord(e.to_string()))?;

    if let Some(fields) = record.as_object_mut() {
        fields.insert("is_game_winner".to_string(), json!(classification.is_game_winner));
        fields.insert("is_piling_on".to_string(), json!(classification.is_piling_on));
        fields.insert("is_tying_goal".to_string(), json!(classification.is_tying_goal));
        fields.insert(
            "is_go_ahead_goal".to_string(),
            json!(classification.is_go_ahead_goal),
        );
        fields.insert("is_overtime".to_string(), json!(event.is_overtime()));
        fields.insert("is_shootout".to_string(), json!(event.is_shootout()));
        fields.insert(
            "score_differential".to_string(),
            json!((event.home_score as i32 - event.away_score as i32).abs()),
        );
        fields.insert(
            "importance_score".to_string(),
            json!(classification.importance_score),
        );
        fields.insert("interest_tags".to_string(), json!(classification.interest_tags));
        fields.insert("filter_tags".to_string(), json!(classification.filter_tags));
    }

    Ok(record)
}

/// Activity payload: root-level queryable dimensions plus a reference
/// to the collection object.
pub fn activity_record(event: &GoalEvent, classification: &GoalClassification) -> Value {
    let primary_assist = event.assists.iter().find(|a| a.kind == AssistKind::Primary);
    let secondary_assist = event.assists.iter().find(|a| a.kind == AssistKind::Secondary);

    json!({
        // Required activity fields
        "actor": format!("team:{}", event.scoring_team.abbrev),
        "verb": "score",
        "object": format!("goal:{}", event.goal_id),
        "foreign_id": format!("goal:{}", event.goal_id),
        "time": event.start_time_utc.clone().or_else(|| event.game_date.clone()),

        // Player dimension
        "scoring_player_id": event.scoring_player.id,
        "scoring_player_name": event.scoring_player.full_name,
        "scoring_player_headshot": event.scoring_player.headshot,
        "scoring_player_position": event.scoring_player.position,
        "scoring_player_sweater": event.scoring_player.sweater_number,

        // Assist dimensions
        "primary_assist_id": primary_assist.map(|a| a.player.id.clone()),
        "primary_assist_name": primary_assist.map(|a| a.player.full_name.clone()),
        "secondary_assist_id": secondary_assist.map(|a| a.player.id.clone()),
        "secondary_assist_name": secondary_assist.map(|a| a.player.full_name.clone()),
        "assists_count": event.assists.len(),

        // Team dimensions
        "scoring_team": event.scoring_team.abbrev,
        "opponent": event.opponent.abbrev,
        "goal_for_team": event.scoring_team.abbrev,
        "goal_against_team": event.opponent.abbrev,
        "home_team": event.home_team,
        "away_team": event.away_team,
        "is_home_goal": event.is_home_goal(),

        // Media dimension
        "highlight_clip_default": event.media.highlight_clip,
        "highlight_clip_fr": event.media.highlight_clip_fr,
        "discrete_clip_default": event.media.discrete_clip,
        "discrete_clip_fr": event.media.discrete_clip_fr,

        // Shot dimension
        "shot_type": event.shot_type,
        "shot_x_coord": event.shot_details.x_coord,
        "shot_y_coord": event.shot_details.y_coord,
        "shot_zone": event.shot_details.zone_code,

        // Goalie dimension
        "goalie_id": event.goalie.as_ref().map(|g| g.id.clone()),
        "goalie_team": event.opponent.abbrev,

        // Goal type dimensions
        "goal_type": event.goal_modifier.as_str(),
        "strength": event.strength,

        // Special classifications
        "is_game_winner": classification.is_game_winner,
        "is_piling_on": classification.is_piling_on,
        "is_overtime": event.is_overtime(),
        "is_shootout": event.is_shootout(),
        "is_empty_net": event.is_empty_net(),
        "is_penalty_shot": event.is_penalty_shot(),
        "is_tying_goal": classification.is_tying_goal,
        "is_go_ahead_goal": classification.is_go_ahead_goal,

        // Game context
        "game_id": event.game_id.to_string(),
        "period": event.period,
        "period_type": event.period_type,
        "time_in_period": event.time_in_period,
        "time_remaining": event.time_remaining,
        "home_score": event.home_score,
        "away_score": event.away_score,

        // Ranking score
        "score": classification.importance_score,

        "interest_tags": classification.interest_tags,
        "filter_tags": classification.filter_tags,
    })
}

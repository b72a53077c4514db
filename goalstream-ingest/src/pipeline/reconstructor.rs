//! Goal reconstruction
//!
//! Extracts scoring events from a game's play-by-play stream, resolves
//! players through the roster lookup, and attaches media references.
//! Media resolution uses at most one batched landing lookup per game:
//! it is skipped entirely when every goal play already carries clips,
//! and a failed lookup degrades to "no media" rather than failing the
//! game.

use crate::models::{
    Assist, AssistKind, GoalEvent, GoalModifier, MediaRefs, ShotDetails, Strength, TeamRef,
};
use crate::pipeline::roster::RosterLookup;
use crate::services::event_source::{
    media_refs, EventSource, Play, PlayByPlay, ScheduledGame,
};
use std::collections::HashMap;

/// Reconstruct all goals for one game.
///
/// Fetches the landing media map only when at least one goal play is
/// missing inline clip references.
pub async fn reconstruct_goals<S: EventSource + ?Sized>(
    source: &S,
    game: &ScheduledGame,
    play_by_play: &PlayByPlay,
) -> Vec<GoalEvent> {
    let goal_plays: Vec<&Play> = play_by_play.plays.iter().filter(|p| p.is_goal()).collect();
    if goal_plays.is_empty() {
        return Vec::new();
    }

    let roster = RosterLookup::from_spots(&play_by_play.roster_spots);

    let needs_media = goal_plays
        .iter()
        .any(|p| p.highlight_clip.is_none() && p.discrete_clip.is_none());

    let media_map: HashMap<i64, MediaRefs> = if needs_media {
        tracing::debug!(
            game_id = game.id,
            goals = goal_plays.len(),
            "Fetching landing media for game"
        );
        match source.landing_media(game.id).await {
            Ok(map) => map,
            Err(e) => {
                // Missing media is recoverable; the goals still publish
                tracing::warn!(game_id = game.id, error = %e, "Landing media lookup failed");
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    goal_plays
        .into_iter()
        .filter_map(|play| match build_goal_event(play, game, &roster, &media_map) {
            Some(event) => Some(event),
            None => {
                tracing::warn!(
                    game_id = game.id,
                    event_id = play.event_id,
                    "Skipping malformed goal play"
                );
                None
            }
        })
        .collect()
}

/// Build one `GoalEvent` from a raw goal play. Pure given its inputs;
/// returns `None` when the play is too malformed to reconstruct.
pub fn build_goal_event(
    play: &Play,
    game: &ScheduledGame,
    roster: &RosterLookup,
    media_map: &HashMap<i64, MediaRefs>,
) -> Option<GoalEvent> {
    let details = play.details.as_ref()?;

    let home = &game.home_team;
    let away = &game.away_team;

    let scoring_is_home = details.event_owner_team_id == Some(home.id);
    let (scoring, opposing) = if scoring_is_home { (home, away) } else { (away, home) };

    let scoring_team = TeamRef {
        abbrev: scoring.abbrev.clone(),
        name: scoring.name.as_ref().map(|n| n.text().to_string()).unwrap_or_default(),
        is_home: scoring_is_home,
    };
    let opponent = TeamRef {
        abbrev: opposing.abbrev.clone(),
        name: opposing.name.as_ref().map(|n| n.text().to_string()).unwrap_or_default(),
        is_home: !scoring_is_home,
    };

    let scoring_player = roster.resolve(details.scoring_player_id, &scoring.abbrev);

    let mut assists = Vec::new();
    if let Some(primary) = roster.resolve_optional(details.assist1_player_id, &scoring.abbrev) {
        assists.push(Assist {
            kind: AssistKind::Primary,
            player: primary,
        });
    }
    if let Some(secondary) = roster.resolve_optional(details.assist2_player_id, &scoring.abbrev) {
        assists.push(Assist {
            kind: AssistKind::Secondary,
            player: secondary,
        });
    }

    let goalie = roster.resolve_optional(details.goalie_in_net_id, &opposing.abbrev);

    // Inline clips win; otherwise fall back to the per-game landing map
    let media = if play.highlight_clip.is_some() || play.discrete_clip.is_some() {
        media_refs(play.highlight_clip.as_ref(), play.discrete_clip.as_ref())
    } else {
        media_map.get(&play.event_id).cloned().unwrap_or_default()
    };

    let shot_type = details.shot_type.clone().unwrap_or_else(|| "unknown".to_string());
    let description = format!(
        "{} ({}) - {}",
        scoring_player.full_name, scoring.abbrev, shot_type
    );

    Some(GoalEvent {
        goal_id: GoalEvent::composite_id(game.id, play.event_id),
        game_id: game.id,
        event_id: play.event_id,
        period: play.period_descriptor.number,
        period_type: play.period_descriptor.period_type,
        time_in_period: play.time_in_period.clone().unwrap_or_else(|| "00:00".to_string()),
        time_remaining: play.time_remaining.clone().unwrap_or_else(|| "00:00".to_string()),
        game_date: game.game_date.clone(),
        start_time_utc: game.start_time_utc.clone().or_else(|| game.game_date.clone()),
        scoring_team,
        opponent,
        home_team: home.abbrev.clone(),
        away_team: away.abbrev.clone(),
        home_score: details.home_score.unwrap_or(0),
        away_score: details.away_score.unwrap_or(0),
        scoring_player,
        assists,
        goalie,
        shot_type,
        shot_details: ShotDetails {
            x_coord: details.x_coord,
            y_coord: details.y_coord,
            zone_code: details.zone_code.clone(),
        },
        goal_modifier: details.goal_modifier.unwrap_or(GoalModifier::EvenStrength),
        strength: details.strength.unwrap_or(Strength::Even),
        media,
        venue: game
            .venue
            .as_ref()
            .map(|v| v.text().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        situation_code: play.situation_code.clone().unwrap_or_default(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestResult;
    use crate::services::event_source::ScheduleDay;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn game() -> ScheduledGame {
        serde_json::from_value(json!({
            "id": 2024020001,
            "gameState": "OFF",
            "homeTeam": { "id": 10, "abbrev": "TOR", "name": { "default": "Maple Leafs" } },
            "awayTeam": { "id": 6, "abbrev": "BOS", "name": { "default": "Bruins" } },
            "gameDate": "2024-11-01",
            "startTimeUTC": "2024-11-01T23:00:00Z",
            "venue": { "default": "Scotiabank Arena" }
        }))
        .unwrap()
    }

    fn play_by_play(goal_extra: serde_json::Value) -> PlayByPlay {
        let mut goal = json!({
            "eventId": 157,
            "typeDescKey": "goal",
            "periodDescriptor": { "number": 1, "periodType": "REG" },
            "timeInPeriod": "04:12",
            "timeRemaining": "15:48",
            "situationCode": "1551",
            "details": {
                "eventOwnerTeamId": 10,
                "scoringPlayerId": 100,
                "assist1PlayerId": 101,
                "goalieInNetId": 200,
                "homeScore": 1,
                "awayScore": 0,
                "shotType": "snap"
            }
        });
        goal.as_object_mut()
            .unwrap()
            .extend(goal_extra.as_object().cloned().unwrap_or_default());

        serde_json::from_value(json!({
            "plays": [
                { "eventId": 10, "typeDescKey": "faceoff" },
                goal,
            ],
            "rosterSpots": [
                {
                    "playerId": 100,
                    "firstName": { "default": "Auston" },
                    "lastName": { "default": "Matthews" },
                    "sweaterNumber": 34,
                    "positionCode": "C",
                    "teamId": 10
                },
                {
                    "playerId": 101,
                    "firstName": { "default": "Mitch" },
                    "lastName": { "default": "Marner" },
                    "positionCode": "R",
                    "teamId": 10
                }
            ]
        }))
        .unwrap()
    }

    /// Fake event source that serves a canned landing media map and
    /// counts lookups
    struct FakeSource {
        landing_calls: AtomicUsize,
        media: HashMap<i64, MediaRefs>,
    }

    impl FakeSource {
        fn new(media: HashMap<i64, MediaRefs>) -> Self {
            Self {
                landing_calls: AtomicUsize::new(0),
                media,
            }
        }
    }

    #[async_trait]
    impl EventSource for FakeSource {
        async fn schedule(&self, _date: NaiveDate) -> IngestResult<ScheduleDay> {
            unimplemented!("not used by reconstruction tests")
        }

        async fn play_by_play(&self, _game_id: i64) -> IngestResult<PlayByPlay> {
            unimplemented!("not used by reconstruction tests")
        }

        async fn landing_media(&self, _game_id: i64) -> IngestResult<HashMap<i64, MediaRefs>> {
            self.landing_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.media.clone())
        }
    }

    #[tokio::test]
    async fn reconstructs_goal_with_roster_enrichment() {
        let source = FakeSource::new(HashMap::new());
        let goals = reconstruct_goals(&source, &game(), &play_by_play(json!({}))).await;

        assert_eq!(goals.len(), 1);
        let goal = &goals[0];
        assert_eq!(goal.goal_id, "2024020001_157");
        assert_eq!(goal.scoring_player.full_name, "Auston Matthews");
        assert_eq!(goal.scoring_team.abbrev, "TOR");
        assert!(goal.scoring_team.is_home);
        assert_eq!(goal.opponent.abbrev, "BOS");
        assert_eq!(goal.assists.len(), 1);
        assert_eq!(goal.assists[0].kind, AssistKind::Primary);
        assert_eq!(goal.assists[0].player.full_name, "Mitch Marner");
        // Goalie id 200 is not on the roster: omitted, not fatal
        assert!(goal.goalie.is_none());
        assert_eq!(goal.venue, "Scotiabank Arena");
        assert_eq!(goal.description, "Auston Matthews (TOR) - snap");
    }

    #[tokio::test]
    async fn landing_lookup_fills_missing_media() {
        let mut media = HashMap::new();
        media.insert(
            157,
            MediaRefs {
                highlight_clip: Some(999),
                ..Default::default()
            },
        );
        let source = FakeSource::new(media);

        let goals = reconstruct_goals(&source, &game(), &play_by_play(json!({}))).await;
        assert_eq!(goals[0].media.highlight_clip, Some(999));
        assert_eq!(source.landing_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn landing_lookup_skipped_when_clips_inline() {
        let source = FakeSource::new(HashMap::new());
        let pbp = play_by_play(json!({ "highlightClip": 555 }));

        let goals = reconstruct_goals(&source, &game(), &pbp).await;
        assert_eq!(goals[0].media.highlight_clip, Some(555));
        assert_eq!(source.landing_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_goal_play_is_skipped() {
        let source = FakeSource::new(HashMap::new());
        let pbp: PlayByPlay = serde_json::from_value(json!({
            "plays": [{ "eventId": 9, "typeDescKey": "goal" }],
            "rosterSpots": []
        }))
        .unwrap();

        let goals = reconstruct_goals(&source, &game(), &pbp).await;
        assert!(goals.is_empty());
    }

    #[tokio::test]
    async fn unknown_scorer_degrades_to_placeholder() {
        let source = FakeSource::new(HashMap::new());
        let mut pbp = play_by_play(json!({}));
        pbp.roster_spots.clear();

        let goals = reconstruct_goals(&source, &game(), &pbp).await;
        assert_eq!(goals.len(), 1);
        assert!(goals[0].scoring_player.is_unknown());
        assert!(goals[0].assists.is_empty());
    }
}

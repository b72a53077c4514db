//! The goal ingestion and ranking pipeline
//!
//! Stages, in data-flow order: roster resolution, goal reconstruction,
//! game-winner classification, importance scoring and tag generation,
//! then publication. The orchestrator drives the stages over a date
//! range and owns the checkpoint.

pub mod game_winner;
pub mod importance;
pub mod orchestrator;
pub mod publisher;
pub mod reconstructor;
pub mod roster;
pub mod tags;

pub use game_winner::{classify_game_winner, WinnerVerdict};
pub use importance::importance_score;
pub use orchestrator::Orchestrator;
pub use publisher::{PublishOutcome, PublishStats, Publisher};
pub use reconstructor::reconstruct_goals;
pub use roster::RosterLookup;
pub use tags::{filter_tags, interest_tags};

use crate::models::{GoalClassification, GoalEvent};

/// Run the per-game classification stages over one game's goals.
///
/// Applies the winner pass once, then derives per-goal flags, the
/// importance rank, and both tag sets.
pub fn classify_goals(goals: Vec<GoalEvent>) -> Vec<(GoalEvent, GoalClassification)> {
    let verdict = classify_game_winner(&goals);

    goals
        .into_iter()
        .map(|event| {
            let is_game_winner = verdict.winner_goal_id.as_deref() == Some(event.goal_id.as_str());
            let is_piling_on = verdict.piling_on_ids.contains(&event.goal_id);
            let classification = GoalClassification {
                is_game_winner,
                is_piling_on,
                is_tying_goal: event.is_tying_goal(),
                is_go_ahead_goal: event.is_go_ahead_goal(),
                importance_score: importance_score(&event, is_game_winner),
                interest_tags: interest_tags(&event, is_game_winner, is_piling_on),
                filter_tags: filter_tags(&event),
            };
            (event, classification)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        GoalModifier, MediaRefs, PeriodType, PlayerRef, ShotDetails, Strength, TeamRef,
    };

    fn goal(
        event_id: i64,
        home_goal: bool,
        home_score: u32,
        away_score: u32,
        period: u32,
        time_remaining: &str,
        goal_modifier: GoalModifier,
    ) -> GoalEvent {
        let (scoring, opposing) = if home_goal { ("TOR", "BOS") } else { ("BOS", "TOR") };
        GoalEvent {
            goal_id: GoalEvent::composite_id(1, event_id),
            game_id: 1,
            event_id,
            period,
            period_type: PeriodType::Regulation,
            time_in_period: "10:00".to_string(),
            time_remaining: time_remaining.to_string(),
            game_date: None,
            start_time_utc: None,
            scoring_team: TeamRef {
                abbrev: scoring.to_string(),
                name: String::new(),
                is_home: home_goal,
            },
            opponent: TeamRef {
                abbrev: opposing.to_string(),
                name: String::new(),
                is_home: !home_goal,
            },
            home_team: "TOR".to_string(),
            away_team: "BOS".to_string(),
            home_score,
            away_score,
            scoring_player: PlayerRef::unknown(scoring),
            assists: vec![],
            goalie: None,
            shot_type: "wrist".to_string(),
            shot_details: ShotDetails::default(),
            goal_modifier,
            strength: Strength::Even,
            media: MediaRefs::default(),
            venue: String::new(),
            situation_code: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn late_winner_with_empty_net_padding() {
        // BOS opens, TOR ties, TOR takes the lead late in the third,
        // then pads into the empty net.
        let goals = vec![
            goal(1, false, 0, 1, 1, "10:00", GoalModifier::EvenStrength),
            goal(2, true, 1, 1, 2, "10:00", GoalModifier::EvenStrength),
            goal(3, true, 2, 1, 3, "01:30", GoalModifier::EvenStrength),
            goal(4, true, 3, 1, 3, "00:30", GoalModifier::EmptyNet),
        ];

        let classified = classify_goals(goals);
        assert_eq!(classified.len(), 4);

        let winner = &classified[2].1;
        assert!(winner.is_game_winner);
        assert!(!winner.is_piling_on);
        assert!(winner.is_go_ahead_goal);
        assert!(winner.importance_score >= 21);
        assert!(winner.interest_tags.contains("game-winner"));

        let padding = &classified[3].1;
        assert!(!padding.is_game_winner);
        assert!(padding.is_piling_on);
        assert!(padding.interest_tags.contains("piling-on"));
        assert!(padding.interest_tags.contains("empty-net"));
        assert!(padding.importance_score >= 1);
        assert!(padding.importance_score < winner.importance_score);

        // Exactly one game-winner per game
        let winners = classified.iter().filter(|(_, c)| c.is_game_winner).count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn classification_carries_event_flags() {
        let goals = vec![goal(1, true, 1, 0, 1, "10:00", GoalModifier::EvenStrength)];
        let classified = classify_goals(goals);
        let (event, classification) = &classified[0];

        assert!(classification.is_game_winner);
        assert!(classification.is_go_ahead_goal);
        assert!(!classification.is_tying_goal);
        assert_eq!(
            classification.importance_score,
            importance_score(event, true)
        );
        assert!(classification.filter_tags.contains("TOR"));
    }
}

//! Game-winner classification
//!
//! Given all of a game's goals in chronological order, determines
//! which one decided the game and which were scored after the outcome
//! was settled. Single deterministic pass, no backtracking: once the
//! final outcome is known, the last goal that gave the eventual winner
//! a lead they never relinquished is provably the decisive one.

use crate::models::GoalEvent;
use std::collections::HashSet;

/// Classifier output for one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinnerVerdict {
    /// Composite id of the game-winning goal, if the game had a winner
    pub winner_goal_id: Option<String>,
    /// Goals scored by the winning team after the outcome was decided
    pub piling_on_ids: HashSet<String>,
}

/// Classify the game-winning goal and piling-on goals.
///
/// The final score is taken from the last goal's running score. A tied
/// final (unfinished or errored record) yields no winner and no
/// piling-on set.
pub fn classify_game_winner(goals: &[GoalEvent]) -> WinnerVerdict {
    let Some(last_goal) = goals.last() else {
        return WinnerVerdict::default();
    };

    let final_home = last_goal.home_score;
    let final_away = last_goal.away_score;
    if final_home == final_away {
        return WinnerVerdict::default();
    }

    let winning_team = if final_home > final_away {
        last_goal.home_team.as_str()
    } else {
        last_goal.away_team.as_str()
    };

    let mut last_lead_change_goal: Option<String> = None;
    let mut piling_on_ids = HashSet::new();

    for goal in goals {
        if goal.scoring_team.abbrev != winning_team {
            continue;
        }

        if goal.is_go_ahead_goal() {
            // Took the lead: the latest such goal is the winner
            last_lead_change_goal = Some(goal.goal_id.clone());
        } else if last_lead_change_goal.is_some() {
            let (prev_team, prev_opp) = goal.relative_prev_scores();
            if prev_team > prev_opp {
                piling_on_ids.insert(goal.goal_id.clone());
            }
        }
    }

    WinnerVerdict {
        winner_goal_id: last_lead_change_goal,
        piling_on_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        GoalModifier, MediaRefs, PeriodType, PlayerRef, ShotDetails, Strength, TeamRef,
    };

    /// Build a goal: `home_goal` marks which side scored, scores are
    /// the running totals after the goal.
    fn goal(event_id: i64, home_goal: bool, home_score: u32, away_score: u32) -> GoalEvent {
        let (scoring, opposing) = if home_goal { ("TOR", "BOS") } else { ("BOS", "TOR") };
        GoalEvent {
            goal_id: GoalEvent::composite_id(1, event_id),
            game_id: 1,
            event_id,
            period: 2,
            period_type: PeriodType::Regulation,
            time_in_period: "10:00".to_string(),
            time_remaining: "10:00".to_string(),
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
            goal_modifier: GoalModifier::EvenStrength,
            strength: Strength::Even,
            media: MediaRefs::default(),
            venue: String::new(),
            situation_code: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn zero_goals_yields_no_winner() {
        let verdict = classify_game_winner(&[]);
        assert_eq!(verdict.winner_goal_id, None);
        assert!(verdict.piling_on_ids.is_empty());
    }

    #[test]
    fn tied_final_yields_no_winner() {
        let goals = vec![goal(1, true, 1, 0), goal(2, false, 1, 1)];
        let verdict = classify_game_winner(&goals);
        assert_eq!(verdict.winner_goal_id, None);
        assert!(verdict.piling_on_ids.is_empty());
    }

    #[test]
    fn sole_goal_is_the_winner_and_never_piling_on() {
        let goals = vec![goal(7, false, 0, 1)];
        let verdict = classify_game_winner(&goals);
        assert_eq!(verdict.winner_goal_id.as_deref(), Some("1_7"));
        assert!(verdict.piling_on_ids.is_empty());
    }

    #[test]
    fn lead_retaken_moves_the_winner_forward() {
        // TOR 1-0, BOS ties 1-1, BOS 1-2, TOR ties 2-2, TOR 3-2 final
        let goals = vec![
            goal(1, true, 1, 0),
            goal(2, false, 1, 1),
            goal(3, false, 1, 2),
            goal(4, true, 2, 2),
            goal(5, true, 3, 2),
        ];
        let verdict = classify_game_winner(&goals);
        assert_eq!(verdict.winner_goal_id.as_deref(), Some("1_5"));
        assert!(verdict.piling_on_ids.is_empty());
    }

    #[test]
    fn padding_after_the_decider_is_piling_on() {
        // TOR leads 1-0, BOS ties, TOR retakes 2-1, TOR adds 3-1 and 4-1
        let goals = vec![
            goal(1, true, 1, 0),
            goal(2, false, 1, 1),
            goal(3, true, 2, 1),
            goal(4, true, 3, 1),
            goal(5, true, 4, 1),
        ];
        let verdict = classify_game_winner(&goals);
        assert_eq!(verdict.winner_goal_id.as_deref(), Some("1_3"));
        assert_eq!(verdict.piling_on_ids.len(), 2);
        assert!(verdict.piling_on_ids.contains("1_4"));
        assert!(verdict.piling_on_ids.contains("1_5"));
    }

    #[test]
    fn winner_is_never_piling_on() {
        let goals = vec![
            goal(1, true, 1, 0),
            goal(2, true, 2, 0),
            goal(3, true, 3, 0),
        ];
        let verdict = classify_game_winner(&goals);
        let winner = verdict.winner_goal_id.clone().unwrap();
        assert!(!verdict.piling_on_ids.contains(&winner));
    }

    #[test]
    fn classification_is_deterministic() {
        let goals = vec![
            goal(1, true, 1, 0),
            goal(2, false, 1, 1),
            goal(3, true, 2, 1),
            goal(4, true, 3, 1),
        ];
        let first = classify_game_winner(&goals);
        for _ in 0..10 {
            assert_eq!(classify_game_winner(&goals), first);
        }
    }

    #[test]
    fn losing_team_goals_are_never_piling_on() {
        // BOS scores late while behind: not piling on
        let goals = vec![
            goal(1, true, 1, 0),
            goal(2, true, 2, 0),
            goal(3, false, 2, 1),
        ];
        let verdict = classify_game_winner(&goals);
        assert_eq!(verdict.winner_goal_id.as_deref(), Some("1_1"));
        assert!(!verdict.piling_on_ids.contains("1_3"));
    }
}

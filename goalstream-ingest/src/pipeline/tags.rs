//! Tag generation
//!
//! Two tag sets per event: free-vocabulary interest tags for human
//! browsing/filtering, and compact filter tags for indexed server-side
//! filtering. Both are derived purely from the event plus its
//! classification, with no external state.

use crate::models::{GoalEvent, GoalModifier, PeriodType, Strength};
use std::collections::BTreeSet;

/// Generate interest tags for topic-based filtering
pub fn interest_tags(
    event: &GoalEvent,
    is_game_winner: bool,
    is_piling_on: bool,
) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    // Team tags
    tags.insert(format!("team:{}", event.scoring_team.abbrev));
    tags.insert(format!("opponent:{}", event.opponent.abbrev));

    // Player tag
    if !event.scoring_player.is_unknown() {
        tags.insert(format!("player:{}", event.scoring_player.id));
    }

    // Shot type tag
    tags.insert(format!("shot:{}", event.shot_type));

    // Goal type tags
    if !matches!(event.goal_modifier, GoalModifier::EvenStrength | GoalModifier::Other) {
        tags.insert(format!("goal:{}", event.goal_modifier.as_str()));
    }

    // Strength tags
    match event.strength {
        Strength::Shorthanded => {
            tags.insert("shorthanded".to_string());
        }
        Strength::Powerplay => {
            tags.insert("powerplay".to_string());
        }
        _ => {}
    }

    // Special situation tags
    if is_game_winner {
        tags.insert("game-winner".to_string());
    }
    if is_piling_on {
        tags.insert("piling-on".to_string());
    }
    if event.is_overtime() {
        tags.insert("overtime".to_string());
    }
    if event.is_shootout() {
        tags.insert("shootout".to_string());
    }
    if event.is_empty_net() {
        tags.insert("empty-net".to_string());
    }
    if event.is_penalty_shot() {
        tags.insert("penalty-shot".to_string());
    }

    // Comeback and clutch tags
    if event.is_tying_goal() {
        tags.insert("tying-goal".to_string());
        tags.insert("comeback".to_string());
    }
    if event.is_go_ahead_goal() {
        tags.insert("go-ahead-goal".to_string());
        tags.insert("comeback".to_string());
    }

    let (team, opp) = event.relative_scores();
    if (team as i32 - opp as i32).abs() <= 1 {
        tags.insert("close-game".to_string());
    }

    if event.is_first_goal() {
        tags.insert("first-goal".to_string());
    }

    // Late-period tags
    if let Some(seconds_remaining) = event.seconds_remaining() {
        if seconds_remaining <= 120 {
            tags.insert("late-period".to_string());
        }
        if seconds_remaining <= 30 {
            tags.insert("buzzer-beater".to_string());
        }
    }

    if event.period == 3 {
        tags.insert("third-period".to_string());
    }
    tags.insert(format!("period:{}", event.period));

    tags.insert(format!(
        "matchup:{}-vs-{}",
        event.scoring_team.abbrev, event.opponent.abbrev
    ));

    tags
}

/// Generate filter tags for server-side indexed filtering: the scoring
/// team code plus the scoring player id (when known).
pub fn filter_tags(event: &GoalEvent) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    tags.insert(event.scoring_team.abbrev.clone());
    if !event.scoring_player.is_unknown() {
        tags.insert(event.scoring_player.id.clone());
    }
    tags
}

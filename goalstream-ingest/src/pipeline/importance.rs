//! Importance scoring
//!
//! Weighted-additive heuristic over independent signal flags. Signals
//! stack; the only reduction (empty-net) is clamped so the result is
//! always >= 1. Deterministic: identical inputs produce the identical
//! score, with no randomness or wall-clock dependence.

use crate::models::{GoalEvent, GoalModifier, PeriodType, Strength};

/// Compute the importance rank for one goal.
///
/// `is_game_winner` comes from the game-level winner pass; everything
/// else is read off the event itself.
pub fn importance_score(event: &GoalEvent, is_game_winner: bool) -> u32 {
    let mut score: i32 = 1;

    // Game-winning goals (highest priority)
    if is_game_winner {
        score += 10;
    }

    let (team, opp) = event.relative_scores();
    let (prev_team, prev_opp) = event.relative_prev_scores();

    // Comeback and clutch situations
    if event.is_tying_goal() {
        score += 7;
    }
    if event.is_go_ahead_goal() {
        score += 6;
    }

    // Insurance goal: one-goal lead stretched to two or more late
    if event.period >= 3 && prev_team as i32 - prev_opp as i32 == 1 && team as i32 - opp as i32 >= 2
    {
        score += 2;
    }

    // Close game bonus
    if (team as i32 - opp as i32).abs() <= 1 {
        score += 2;
    }

    // Late-period goals; the two windows stack
    if let Some(seconds_remaining) = event.seconds_remaining() {
        if seconds_remaining > 0 && seconds_remaining <= 120 {
            score += 3;
        }
        if seconds_remaining > 0 && seconds_remaining <= 30 {
            score += 2;
        }
    }

    // Third period, unless already credited as the game-winner
    if event.period == 3 && !is_game_winner {
        score += 1;
    }

    // Overtime and shootout
    if event.period > 3 || event.period_type == PeriodType::Overtime {
        score += 5;
    }
    if event.period_type == PeriodType::Shootout {
        score += 3;
    }

    // Strength situations
    if event.strength == Strength::Powerplay || event.goal_modifier == GoalModifier::PowerPlay {
        score += 1;
    }
    if event.strength == Strength::Shorthanded || event.goal_modifier == GoalModifier::ShortHanded {
        score += 4;
    }

    // Special goal types
    if event.goal_modifier == GoalModifier::PenaltyShot {
        score += 3;
    }
    if event.goal_modifier == GoalModifier::EmptyNet {
        score -= 1;
        if score < 1 {
            score = 1;
        }
    }

    // First goal of the game
    if event.is_first_goal() {
        score += 1;
    }

    score.max(1) as u32
}

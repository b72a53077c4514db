//! Classification outputs computed per scoring event
//!
//! These are derived from the event plus the game-level winner pass;
//! they are carried alongside the `GoalEvent` into publication but are
//! never stored independently.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Computed classification for one goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalClassification {
    /// The last goal that gave the eventual winner a lead they kept
    pub is_game_winner: bool,
    /// Scored by the already-winning team after the outcome was decided
    pub is_piling_on: bool,
    /// Scorer's team was behind, now tied
    pub is_tying_goal: bool,
    /// Scorer's team was tied or behind, now strictly ahead
    pub is_go_ahead_goal: bool,
    /// Numeric importance rank, always >= 1
    pub importance_score: u32,
    /// Free-vocabulary labels for human browsing/filtering
    pub interest_tags: BTreeSet<String>,
    /// Compact labels for indexed server-side filtering
    pub filter_tags: BTreeSet<String>,
}

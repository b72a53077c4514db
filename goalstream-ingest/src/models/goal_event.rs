//! Reconstructed scoring events
//!
//! A `GoalEvent` is the canonical record built from one "goal" play in
//! the play-by-play stream, enriched with roster and media data. The
//! composite `goal_id` (`{game_id}_{event_id}`) is globally unique and
//! stable across re-runs; it is the idempotency key for publication.

use goalstream_common::clock::parse_clock;
use serde::{Deserialize, Serialize};

/// Period type as reported by the event source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    #[serde(rename = "REG")]
    Regulation,
    #[serde(rename = "OT")]
    Overtime,
    #[serde(rename = "SO")]
    Shootout,
    #[serde(other)]
    Other,
}

impl Default for PeriodType {
    fn default() -> Self {
        PeriodType::Regulation
    }
}

/// Strength situation when the goal was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Even,
    Powerplay,
    Shorthanded,
    #[serde(other)]
    Other,
}

impl Default for Strength {
    fn default() -> Self {
        Strength::Even
    }
}

/// Goal modifier reported on the play (default: even-strength)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalModifier {
    EvenStrength,
    EmptyNet,
    PenaltyShot,
    PowerPlay,
    ShortHanded,
    #[serde(other)]
    Other,
}

impl Default for GoalModifier {
    fn default() -> Self {
        GoalModifier::EvenStrength
    }
}

impl GoalModifier {
    /// Kebab-case label used in tags and published records
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalModifier::EvenStrength => "even-strength",
            GoalModifier::EmptyNet => "empty-net",
            GoalModifier::PenaltyShot => "penalty-shot",
            GoalModifier::PowerPlay => "power-play",
            GoalModifier::ShortHanded => "short-handed",
            GoalModifier::Other => "other",
        }
    }
}

/// Player display attributes resolved from the game roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Player id as a string; `"unknown"` when roster resolution failed
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sweater_number: Option<u32>,
    pub position: Option<String>,
    pub headshot: Option<String>,
    pub team_abbrev: String,
}

impl PlayerRef {
    /// Placeholder for players missing from the roster lookup
    pub fn unknown(team_abbrev: &str) -> Self {
        Self {
            id: "unknown".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            full_name: "Unknown".to_string(),
            sweater_number: None,
            position: None,
            headshot: None,
            team_abbrev: team_abbrev.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id == "unknown"
    }
}

/// Assist credit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistKind {
    Primary,
    Secondary,
}

/// Assisting player with credit order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assist {
    pub kind: AssistKind,
    #[serde(flatten)]
    pub player: PlayerRef,
}

/// Team reference within a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRef {
    pub abbrev: String,
    pub name: String,
    pub is_home: bool,
}

/// Highlight video references, per locale
///
/// The play-by-play sometimes carries these inline; when it does not,
/// the reconstructor fills them from one batched landing lookup per game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaRefs {
    pub highlight_clip: Option<i64>,
    pub highlight_clip_fr: Option<i64>,
    pub discrete_clip: Option<i64>,
    pub discrete_clip_fr: Option<i64>,
}

impl MediaRefs {
    /// True when no clip reference is present at all
    pub fn is_empty(&self) -> bool {
        self.highlight_clip.is_none() && self.discrete_clip.is_none()
    }
}

/// Shot location details
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotDetails {
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    pub zone_code: Option<String>,
}

/// A reconstructed scoring event (canonical snake_case schema)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalEvent {
    /// Composite id `{game_id}_{event_id}`, the idempotency key
    pub goal_id: String,
    pub game_id: i64,
    pub event_id: i64,

    // Timing
    pub period: u32,
    pub period_type: PeriodType,
    pub time_in_period: String,
    pub time_remaining: String,
    pub game_date: Option<String>,
    pub start_time_utc: Option<String>,

    // Teams
    pub scoring_team: TeamRef,
    pub opponent: TeamRef,
    pub home_team: String,
    pub away_team: String,

    // Score after this goal
    pub home_score: u32,
    pub away_score: u32,

    // Players
    pub scoring_player: PlayerRef,
    pub assists: Vec<Assist>,
    pub goalie: Option<PlayerRef>,

    // Shot classification
    pub shot_type: String,
    pub shot_details: ShotDetails,
    pub goal_modifier: GoalModifier,
    pub strength: Strength,

    // Media
    pub media: MediaRefs,

    // Context
    pub venue: String,
    pub situation_code: String,
    pub description: String,
}

impl GoalEvent {
    pub fn is_home_goal(&self) -> bool {
        self.scoring_team.is_home
    }

    /// Score before this goal (one goal subtracted from the scoring side)
    pub fn prev_scores(&self) -> (u32, u32) {
        if self.is_home_goal() {
            (self.home_score.saturating_sub(1), self.away_score)
        } else {
            (self.home_score, self.away_score.saturating_sub(1))
        }
    }

    /// Score after this goal, (scoring team, opponent) order
    pub fn relative_scores(&self) -> (u32, u32) {
        if self.is_home_goal() {
            (self.home_score, self.away_score)
        } else {
            (self.away_score, self.home_score)
        }
    }

    /// Score before this goal, (scoring team, opponent) order
    pub fn relative_prev_scores(&self) -> (u32, u32) {
        let (prev_home, prev_away) = self.prev_scores();
        if self.is_home_goal() {
            (prev_home, prev_away)
        } else {
            (prev_away, prev_home)
        }
    }

    /// The scoring team was behind and this goal tied the game
    pub fn is_tying_goal(&self) -> bool {
        let (prev_team, prev_opp) = self.relative_prev_scores();
        let (team, opp) = self.relative_scores();
        prev_team < prev_opp && team == opp
    }

    /// The scoring team was tied or behind and is now strictly ahead
    pub fn is_go_ahead_goal(&self) -> bool {
        let (prev_team, prev_opp) = self.relative_prev_scores();
        let (team, opp) = self.relative_scores();
        prev_team <= prev_opp && team > opp
    }

    /// First goal of the game (score becomes 1-0 either way)
    pub fn is_first_goal(&self) -> bool {
        (self.home_score == 1 && self.away_score == 0)
            || (self.home_score == 0 && self.away_score == 1)
    }

    pub fn is_overtime(&self) -> bool {
        self.period > 3 || self.period_type == PeriodType::Overtime
    }

    pub fn is_shootout(&self) -> bool {
        self.period_type == PeriodType::Shootout
    }

    pub fn is_empty_net(&self) -> bool {
        self.goal_modifier == GoalModifier::EmptyNet
    }

    pub fn is_penalty_shot(&self) -> bool {
        self.goal_modifier == GoalModifier::PenaltyShot
    }

    /// Seconds left in the period, if the clock string is well-formed
    pub fn seconds_remaining(&self) -> Option<u32> {
        parse_clock(&self.time_remaining)
    }

    /// Build the composite idempotency key
    pub fn composite_id(game_id: i64, event_id: i64) -> String {
        format!("{}_{}", game_id, event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(is_home_goal: bool, home_score: u32, away_score: u32) -> GoalEvent {
        GoalEvent {
            goal_id: GoalEvent::composite_id(2024020001, 157),
            game_id: 2024020001,
            event_id: 157,
            period: 2,
            period_type: PeriodType::Regulation,
            time_in_period: "05:00".to_string(),
            time_remaining: "15:00".to_string(),
            game_date: Some("2024-11-01".to_string()),
            start_time_utc: Some("2024-11-01T23:00:00Z".to_string()),
            scoring_team: TeamRef {
                abbrev: if is_home_goal { "TOR" } else { "BOS" }.to_string(),
                name: String::new(),
                is_home: is_home_goal,
            },
            opponent: TeamRef {
                abbrev: if is_home_goal { "BOS" } else { "TOR" }.to_string(),
                name: String::new(),
                is_home: !is_home_goal,
            },
            home_team: "TOR".to_string(),
            away_team: "BOS".to_string(),
            home_score,
            away_score,
            scoring_player: PlayerRef::unknown("TOR"),
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
    fn composite_id_is_game_and_event() {
        assert_eq!(GoalEvent::composite_id(2024020001, 157), "2024020001_157");
    }

    #[test]
    fn prev_scores_subtract_from_scoring_side() {
        let home_goal = event(true, 3, 2);
        assert_eq!(home_goal.prev_scores(), (2, 2));

        let away_goal = event(false, 3, 2);
        assert_eq!(away_goal.prev_scores(), (3, 1));
    }

    #[test]
    fn tying_and_go_ahead_flags() {
        // Home team was down 1-2, now 2-2: tying, not go-ahead
        let tying = event(true, 2, 2);
        assert!(tying.is_tying_goal());
        assert!(!tying.is_go_ahead_goal());

        // Home team was tied 2-2, now 3-2: go-ahead, not tying
        let go_ahead = event(true, 3, 2);
        assert!(go_ahead.is_go_ahead_goal());
        assert!(!go_ahead.is_tying_goal());

        // Home team already ahead 3-1 scoring to 4-1: neither
        let padding = event(true, 4, 1);
        assert!(!padding.is_tying_goal());
        assert!(!padding.is_go_ahead_goal());
    }

    #[test]
    fn first_goal_detection() {
        assert!(event(true, 1, 0).is_first_goal());
        assert!(event(false, 0, 1).is_first_goal());
        assert!(!event(true, 2, 1).is_first_goal());
    }

    #[test]
    fn overtime_and_shootout_flags() {
        let mut ot = event(true, 1, 0);
        ot.period = 4;
        assert!(ot.is_overtime());
        assert!(!ot.is_shootout());

        let mut so = event(true, 1, 0);
        so.period = 5;
        so.period_type = PeriodType::Shootout;
        assert!(so.is_shootout());
    }
}

//! Sports event-source API client
//!
//! Fetches schedule, play-by-play, and supplemental landing (media)
//! data for games. Pure I/O: response shapes are decoded here, all
//! business logic lives in the pipeline. Requests are spaced by a
//! fixed minimum interval to respect upstream rate limits.

use crate::error::{IngestError, IngestResult};
use crate::models::{MediaRefs, PeriodType};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const USER_AGENT: &str = "goalstream/0.1.0 (https://github.com/goalstream/goalstream)";

/// Game lifecycle state as reported by the schedule endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GameState {
    #[serde(rename = "FUT")]
    Future,
    #[serde(rename = "PRE")]
    PreGame,
    #[serde(rename = "LIVE")]
    Live,
    #[serde(rename = "CRIT")]
    Critical,
    #[serde(rename = "FINAL")]
    Final,
    #[serde(rename = "OFF")]
    OfficialFinal,
    #[serde(other)]
    Other,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::Future
    }
}

impl GameState {
    /// Terminal states: the game can no longer produce new goals
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::Final | GameState::OfficialFinal)
    }

    pub fn is_live(&self) -> bool {
        matches!(self, GameState::Live | GameState::Critical)
    }
}

/// Localized text field: the upstream sends either a plain string or a
/// `{ "default": ..., "fr": ... }` map depending on the endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized {
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        fr: Option<String>,
    },
}

impl LocalizedText {
    pub fn text(&self) -> &str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::Localized { default, .. } => default.as_deref().unwrap_or(""),
        }
    }
}

/// Clip reference: plain id or localized `{ default, fr }` map
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClipRef {
    Id(i64),
    Localized {
        #[serde(default)]
        default: Option<i64>,
        #[serde(default)]
        fr: Option<i64>,
    },
}

impl ClipRef {
    pub fn default_id(&self) -> Option<i64> {
        match self {
            ClipRef::Id(id) => Some(*id),
            ClipRef::Localized { default, .. } => *default,
        }
    }

    pub fn fr_id(&self) -> Option<i64> {
        match self {
            ClipRef::Id(_) => None,
            ClipRef::Localized { fr, .. } => *fr,
        }
    }
}

/// Build `MediaRefs` from a pair of optional clip references
pub fn media_refs(highlight: Option<&ClipRef>, discrete: Option<&ClipRef>) -> MediaRefs {
    MediaRefs {
        highlight_clip: highlight.and_then(ClipRef::default_id),
        highlight_clip_fr: highlight.and_then(ClipRef::fr_id),
        discrete_clip: discrete.and_then(ClipRef::default_id),
        discrete_clip_fr: discrete.and_then(ClipRef::fr_id),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTeam {
    pub id: i64,
    pub abbrev: String,
    #[serde(default, alias = "placeName")]
    pub name: Option<LocalizedText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledGame {
    pub id: i64,
    #[serde(default)]
    pub game_state: GameState,
    pub home_team: ScheduledTeam,
    pub away_team: ScheduledTeam,
    #[serde(default)]
    pub game_date: Option<String>,
    #[serde(default, rename = "startTimeUTC")]
    pub start_time_utc: Option<String>,
    #[serde(default)]
    pub venue: Option<LocalizedText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameDay {
    date: NaiveDate,
    #[serde(default)]
    games: Vec<ScheduledGame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse {
    #[serde(default)]
    game_week: Vec<GameDay>,
}

/// One calendar date's slate of games
#[derive(Debug, Clone)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub games: Vec<ScheduledGame>,
}

impl ScheduleDay {
    /// True iff every game is in a terminal state. A date with no
    /// scheduled games also counts as finished.
    pub fn all_finished(&self) -> bool {
        self.games.iter().all(|g| g.game_state.is_terminal())
    }

    pub fn finished_games(&self) -> usize {
        self.games.iter().filter(|g| g.game_state.is_terminal()).count()
    }

    pub fn live_games(&self) -> usize {
        self.games.iter().filter(|g| g.game_state.is_live()).count()
    }

    pub fn future_games(&self) -> usize {
        self.games
            .iter()
            .filter(|g| matches!(g.game_state, GameState::Future | GameState::PreGame))
            .count()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDescriptor {
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub period_type: PeriodType,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayDetails {
    #[serde(default)]
    pub event_owner_team_id: Option<i64>,
    #[serde(default)]
    pub scoring_player_id: Option<i64>,
    #[serde(default)]
    pub assist1_player_id: Option<i64>,
    #[serde(default)]
    pub assist2_player_id: Option<i64>,
    #[serde(default)]
    pub goalie_in_net_id: Option<i64>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub x_coord: Option<f64>,
    #[serde(default)]
    pub y_coord: Option<f64>,
    #[serde(default)]
    pub zone_code: Option<String>,
    #[serde(default)]
    pub goal_modifier: Option<crate::models::GoalModifier>,
    #[serde(default)]
    pub strength: Option<crate::models::Strength>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub event_id: i64,
    #[serde(default)]
    pub type_desc_key: String,
    #[serde(default)]
    pub period_descriptor: PeriodDescriptor,
    #[serde(default)]
    pub time_in_period: Option<String>,
    #[serde(default)]
    pub time_remaining: Option<String>,
    #[serde(default)]
    pub situation_code: Option<String>,
    #[serde(default)]
    pub details: Option<PlayDetails>,
    #[serde(default)]
    pub highlight_clip: Option<ClipRef>,
    #[serde(default)]
    pub discrete_clip: Option<ClipRef>,
}

impl Play {
    pub fn is_goal(&self) -> bool {
        self.type_desc_key == "goal"
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSpot {
    pub player_id: i64,
    #[serde(default)]
    pub first_name: Option<LocalizedText>,
    #[serde(default)]
    pub last_name: Option<LocalizedText>,
    #[serde(default)]
    pub sweater_number: Option<u32>,
    #[serde(default)]
    pub position_code: Option<String>,
    #[serde(default)]
    pub headshot: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

/// Play-by-play payload for one game
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlay {
    #[serde(default)]
    pub plays: Vec<Play>,
    #[serde(default)]
    pub roster_spots: Vec<RosterSpot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LandingGoal {
    #[serde(default)]
    event_id: Option<i64>,
    #[serde(default)]
    highlight_clip: Option<ClipRef>,
    #[serde(default)]
    discrete_clip: Option<ClipRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct LandingPeriod {
    #[serde(default)]
    goals: Vec<LandingGoal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LandingSummary {
    #[serde(default)]
    scoring: Vec<LandingPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
struct LandingResponse {
    #[serde(default)]
    summary: Option<LandingSummary>,
}

/// Event-source seam consumed by the pipeline
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Schedule for one calendar date (empty game list when nothing is scheduled)
    async fn schedule(&self, date: NaiveDate) -> IngestResult<ScheduleDay>;

    /// Ordered plays plus roster for one game
    async fn play_by_play(&self, game_id: i64) -> IngestResult<PlayByPlay>;

    /// Supplemental per-goal media ids for one game, keyed by event id
    async fn landing_media(&self, game_id: i64) -> IngestResult<HashMap<i64, MediaRefs>>;
}

/// Fixed-interval request spacer
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the minimum request interval
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Production event-source client (NHL web API shape)
pub struct NhlApiClient {
    base_url: String,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl NhlApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        min_request_interval: Duration,
    ) -> IngestResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::EventSource(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            http_client,
            rate_limiter: RateLimiter::new(min_request_interval),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> IngestResult<T> {
        self.rate_limiter.wait().await;

        tracing::debug!(url = %url, "Querying event source");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::EventSource(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::EventSource(format!(
                "{} returned {}: {}",
                url,
                status.as_u16(),
                body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IngestError::EventSource(format!("decode {}: {}", url, e)))
    }
}

#[async_trait]
impl EventSource for NhlApiClient {
    async fn schedule(&self, date: NaiveDate) -> IngestResult<ScheduleDay> {
        let url = format!("{}/schedule/{}", self.base_url, date.format("%Y-%m-%d"));
        let response: ScheduleResponse = self.get_json(&url).await?;

        // The schedule endpoint returns the surrounding week; keep only
        // the requested date.
        let games = response
            .game_week
            .into_iter()
            .find(|day| day.date == date)
            .map(|day| day.games)
            .unwrap_or_default();

        Ok(ScheduleDay { date, games })
    }

    async fn play_by_play(&self, game_id: i64) -> IngestResult<PlayByPlay> {
        let url = format!("{}/gamecenter/{}/play-by-play", self.base_url, game_id);
        self.get_json(&url).await
    }

    async fn landing_media(&self, game_id: i64) -> IngestResult<HashMap<i64, MediaRefs>> {
        let url = format!("{}/gamecenter/{}/landing", self.base_url, game_id);
        let response: LandingResponse = self.get_json(&url).await?;

        let mut map = HashMap::new();
        let summary = response.summary.unwrap_or_default();
        for period in summary.scoring {
            for goal in period.goals {
                if let Some(event_id) = goal.event_id {
                    map.insert(
                        event_id,
                        media_refs(goal.highlight_clip.as_ref(), goal.discrete_clip.as_ref()),
                    );
                }
            }
        }

        Ok(map)
    }
}

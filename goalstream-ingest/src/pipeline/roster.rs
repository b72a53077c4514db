//! Roster resolution
//!
//! Builds a per-game lookup from player id to display attributes. Raw
//! plays reference players only by id; the roster spots on the
//! play-by-play payload carry names, sweater numbers, and positions.
//! Missing entries degrade to an "unknown player" placeholder rather
//! than failing the event.

use crate::models::PlayerRef;
use crate::services::event_source::RosterSpot;
use std::collections::HashMap;

/// Resolved roster entry
#[derive(Debug, Clone)]
struct RosterPlayer {
    first_name: String,
    last_name: String,
    sweater_number: Option<u32>,
    position: Option<String>,
    headshot: Option<String>,
}

/// Per-game player id → display attributes lookup
#[derive(Debug, Default)]
pub struct RosterLookup {
    players: HashMap<i64, RosterPlayer>,
}

impl RosterLookup {
    pub fn from_spots(spots: &[RosterSpot]) -> Self {
        let players = spots
            .iter()
            .map(|spot| {
                (
                    spot.player_id,
                    RosterPlayer {
                        first_name: spot
                            .first_name
                            .as_ref()
                            .map(|n| n.text().to_string())
                            .unwrap_or_default(),
                        last_name: spot
                            .last_name
                            .as_ref()
                            .map(|n| n.text().to_string())
                            .unwrap_or_default(),
                        sweater_number: spot.sweater_number,
                        position: spot.position_code.clone(),
                        headshot: spot.headshot.clone(),
                    },
                )
            })
            .collect();

        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Resolve a player id to display attributes.
    ///
    /// `None` ids and ids absent from the roster both resolve to the
    /// unknown-player placeholder carrying the team code.
    pub fn resolve(&self, player_id: Option<i64>, team_abbrev: &str) -> PlayerRef {
        let Some(id) = player_id else {
            return PlayerRef::unknown(team_abbrev);
        };

        match self.players.get(&id) {
            Some(player) => {
                let full_name =
                    format!("{} {}", player.first_name, player.last_name).trim().to_string();
                PlayerRef {
                    id: id.to_string(),
                    first_name: player.first_name.clone(),
                    last_name: player.last_name.clone(),
                    full_name: if full_name.is_empty() {
                        "Unknown".to_string()
                    } else {
                        full_name
                    },
                    sweater_number: player.sweater_number,
                    position: player.position.clone(),
                    headshot: player.headshot.clone(),
                    team_abbrev: team_abbrev.to_string(),
                }
            }
            None => {
                tracing::debug!(player_id = id, "Player missing from roster, using placeholder");
                PlayerRef::unknown(team_abbrev)
            }
        }
    }

    /// Like `resolve`, but `None` when the id is absent. Used for
    /// optional participants (assists, goalie) that are simply omitted
    /// when unresolvable.
    pub fn resolve_optional(&self, player_id: Option<i64>, team_abbrev: &str) -> Option<PlayerRef> {
        let id = player_id?;
        if self.players.contains_key(&id) {
            Some(self.resolve(Some(id), team_abbrev))
        } else {
            None
        }
    }
}

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::Serialize;

use super::entity::{EntityId, Side};
use super::match_log::MatchLogEntry;
use super::player::{Card, Player};
use crate::resolver::EntityResolver;

pub const MAX_PLAYERS: usize = 2;

/// `game_over_count` stops here; the match is finished.
pub const TERMINAL_GAME_OVER_COUNT: u8 = 2;

/// Aggregate root for one match.
/// Mutated exclusively by the parser pipeline; mutation helpers live here,
/// routing lives in the handlers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameState {
    pub start_time: Option<NaiveDateTime>,
    /// Stamped once, at the second terminal play state.
    pub match_duration_ms: Option<i64>,
    pub game_over_count: u8,
    pub begin_phase_active: bool,
    pub mulligan_active: bool,
    pub turn_start_time: Option<NaiveDateTime>,
    /// Incremented on every turn change; lets observers detect turn boundaries.
    pub turn_sequence: u64,
    pub game_entity_id: Option<EntityId>,
    /// Client scene from the latest loading-screen transition.
    pub scene: Option<String>,

    pub players: Vec<Player>,
    pub match_log: Vec<MatchLogEntry>,

    /// Last-known entity facts, used for resolution only (not gameplay truth).
    #[serde(skip)]
    pub entities: EntityResolver,

    /// Board side each player was seen on while the mulligan ran.
    #[serde(skip)]
    mulligan_sides: HashMap<u32, Side>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the empty, pre-match state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Discard everything from a previous match and stamp the new start.
    pub fn start(&mut self, now: NaiveDateTime) {
        self.reset();
        self.start_time = Some(now);
        self.begin_phase_active = true;
        tracing::info!(start = %now, "Match started");
    }

    pub fn is_over(&self) -> bool {
        self.game_over_count >= TERMINAL_GAME_OVER_COUNT
    }

    // --- Players ---

    pub fn player(&self, player_id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn player_mut(&mut self, player_id: u32) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.player_id == player_id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| !p.name.is_empty() && p.name == name)
    }

    pub fn player_at(&self, side: Side) -> Option<&Player> {
        self.players.iter().find(|p| p.position == Some(side))
    }

    /// Get or create a player. A third distinct player is rejected.
    pub fn register_player(&mut self, player_id: u32) -> Option<&mut Player> {
        if let Some(idx) = self.players.iter().position(|p| p.player_id == player_id) {
            return self.players.get_mut(idx);
        }
        if self.players.len() >= MAX_PLAYERS {
            tracing::warn!(player_id, "Rejecting third player");
            return None;
        }
        self.players.push(Player::new(player_id));
        self.players.last_mut()
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.turn)
    }

    pub fn active_player_mut(&mut self) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.turn)
    }

    // --- Cards ---

    /// Index of the player whose collection currently holds this entity.
    pub fn holder_index(&self, entity_id: EntityId) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.card(entity_id).is_some())
    }

    pub fn card(&self, entity_id: EntityId) -> Option<(&Player, &Card)> {
        self.players
            .iter()
            .find_map(|p| p.card(entity_id).map(|c| (p, c)))
    }

    // --- Mulligan positions ---

    /// Record the side a player was seen on during the mulligan.
    /// Positions are assigned once both players have been observed and never change afterwards.
    pub fn observe_mulligan_side(&mut self, player_id: u32, side: Side) -> bool {
        if self.positions_assigned() {
            return false;
        }
        self.mulligan_sides.insert(player_id, side);
        if self.mulligan_sides.len() < MAX_PLAYERS {
            return false;
        }

        let mut assigned = false;
        for player in &mut self.players {
            if let Some(&side) = self.mulligan_sides.get(&player.player_id) {
                player.position = Some(side);
                assigned = true;
            }
        }
        if assigned {
            tracing::debug!(sides = ?self.mulligan_sides, "Player positions assigned");
        }
        assigned
    }

    pub fn positions_assigned(&self) -> bool {
        self.players.len() == MAX_PLAYERS && self.players.iter().all(|p| p.position.is_some())
    }
}

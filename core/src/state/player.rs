use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::entity::{DisplayTag, EntityId, Side};
use super::match_log::EntitySnapshot;

/// Coarse zone a card occupies, as far as consumers care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardState {
    Deck,
    Hand,
    Others,
}

impl CardState {
    /// `zone` is the logged zone name, optionally followed by a qualifier (`PLAY (Hero)`).
    pub fn from_zone(zone: &str) -> CardState {
        match zone.split_whitespace().next() {
            Some("DECK") => CardState::Deck,
            Some("HAND") => CardState::Hand,
            _ => CardState::Others,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayStatus {
    Won,
    Lost,
    Tied,
}

impl PlayStatus {
    pub fn from_log(value: &str) -> Option<PlayStatus> {
        match value {
            "WON" => Some(PlayStatus::Won),
            "LOST" => Some(PlayStatus::Lost),
            "TIED" => Some(PlayStatus::Tied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub entity_id: EntityId,
    pub card_id: u32,
    pub card_code: String,
    pub card_name: String,
    pub state: CardState,
    /// False only for cards that started the match in the deck.
    pub is_spawned_card: bool,
    pub tags: Vec<DisplayTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub entity_id: EntityId,
    pub card_code: String,
    pub card_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub entity_id: EntityId,
    pub card_code: String,
    pub progress: u32,
    pub requirement: u32,
}

/// An in-progress "pick one of these" choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub active: bool,
    pub source: Option<EntitySnapshot>,
    pub options: Vec<EntitySnapshot>,
    pub chosen: Option<EntitySnapshot>,
}

impl Discovery {
    pub fn begin(&mut self) {
        *self = Discovery {
            active: true,
            ..Default::default()
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub start: NaiveDateTime,
    pub duration_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mana {
    pub total: i32,
    pub used: i32,
    pub temporary: i32,
    pub overload_owed: i32,
    pub overload_locked: i32,
}

impl Mana {
    pub fn available(&self) -> i32 {
        self.total
            .saturating_add(self.temporary)
            .saturating_sub(self.used)
            .saturating_sub(self.overload_locked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: u32,
    pub entity_id: Option<EntityId>,
    pub name: String,
    pub position: Option<Side>,
    pub turn: bool,
    pub turn_history: Vec<TurnRecord>,
    pub status: Option<PlayStatus>,
    pub mana: Mana,
    /// Turn timer in seconds, as last reported.
    pub timeout: Option<u32>,
    pub cards: Vec<Card>,
    pub secrets: Vec<Secret>,
    pub quests: Vec<Quest>,
    pub discovery: Discovery,
    pub mulligan_done: bool,
    /// Cards drawn from the deck once the mulligan was over.
    pub card_count: u32,
    pub cards_replaced_in_mulligan: Option<i32>,
}

impl Player {
    pub fn new(player_id: u32) -> Self {
        Self {
            player_id,
            entity_id: None,
            name: String::new(),
            position: None,
            turn: false,
            turn_history: Vec::new(),
            status: None,
            mana: Mana::default(),
            timeout: None,
            cards: Vec::new(),
            secrets: Vec::new(),
            quests: Vec::new(),
            discovery: Discovery::default(),
            mulligan_done: false,
            card_count: 0,
            cards_replaced_in_mulligan: None,
        }
    }

    // --- Cards ---

    pub fn card(&self, entity_id: EntityId) -> Option<&Card> {
        self.cards.iter().find(|c| c.entity_id == entity_id)
    }

    pub fn card_mut(&mut self, entity_id: EntityId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.entity_id == entity_id)
    }

    pub fn take_card(&mut self, entity_id: EntityId) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.entity_id == entity_id)?;
        Some(self.cards.remove(idx))
    }

    pub fn cards_in(&self, state: CardState) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.state == state)
    }

    // --- Secrets & quests ---

    /// Drop secret and quest records backed by this entity. Returns true if any existed.
    pub fn remove_secret_records(&mut self, entity_id: EntityId) -> bool {
        let before = self.secrets.len() + self.quests.len();
        self.secrets.retain(|s| s.entity_id != entity_id);
        self.quests.retain(|q| q.entity_id != entity_id);
        before != self.secrets.len() + self.quests.len()
    }

    pub fn quest_mut(&mut self, entity_id: EntityId) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.entity_id == entity_id)
    }

    // --- Turns ---

    pub fn begin_turn(&mut self, now: NaiveDateTime) {
        self.turn = true;
        self.turn_history.push(TurnRecord {
            start: now,
            duration_ms: None,
        });
    }

    /// Clear the turn flag and close the open history entry, if any.
    pub fn end_turn(&mut self, now: NaiveDateTime) -> bool {
        let was_active = std::mem::replace(&mut self.turn, false);
        let closed = self.close_last_turn(now);
        was_active || closed
    }

    pub fn close_last_turn(&mut self, now: NaiveDateTime) -> bool {
        match self.turn_history.last_mut() {
            Some(last) if last.duration_ms.is_none() => {
                last.duration_ms = Some(now.signed_duration_since(last.start).num_milliseconds());
                true
            }
            _ => false,
        }
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.turn_history.last()
    }
}

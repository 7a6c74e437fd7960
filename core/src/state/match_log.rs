use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::entity::{CardEntity, DisplayTag, EntityId, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Attack,
    Play,
    Trigger,
}

impl ActionKind {
    /// Map a logged `BlockType` onto the actions kept in the match log.
    pub fn from_block_type(block_type: &str) -> Option<ActionKind> {
        match block_type {
            "ATTACK" => Some(ActionKind::Attack),
            "PLAY" => Some(ActionKind::Play),
            "TRIGGER" => Some(ActionKind::Trigger),
            _ => None,
        }
    }
}

/// Entity properties as they were when the action happened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_id: EntityId,
    pub card_id: Option<u32>,
    pub card_code: String,
    /// Empty while the entity is unresolved; patched in place once known.
    pub card_name: String,
    pub side: Option<Side>,
    pub damage: Option<i32>,
    pub healing: Option<i32>,
    pub dead: bool,
    pub tags: Vec<DisplayTag>,
}

impl EntitySnapshot {
    pub fn of(card: &CardEntity) -> Self {
        Self {
            entity_id: card.entity_id,
            card_id: card.card_id,
            card_code: card.card_code.clone(),
            card_name: card.card_name.clone(),
            side: card.side,
            tags: card.display_tags(),
            ..Default::default()
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.card_name.is_empty()
    }

    /// Overwrite the identity fields with a resolved entity. Returns true if anything changed.
    pub fn resolve_from(&mut self, card: &CardEntity) -> bool {
        if !self.is_unresolved() || self.entity_id != card.entity_id || !card.is_resolved() {
            return false;
        }
        self.card_name = card.card_name.clone();
        self.card_id = card.card_id.or(self.card_id);
        if !card.card_code.is_empty() {
            self.card_code = card.card_code.clone();
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLogEntry {
    pub kind: ActionKind,
    pub timestamp: NaiveDateTime,
    pub source: EntitySnapshot,
    pub targets: Vec<EntitySnapshot>,
}

impl MatchLogEntry {
    pub fn new(kind: ActionKind, timestamp: NaiveDateTime, source: EntitySnapshot) -> Self {
        Self {
            kind,
            timestamp,
            source,
            targets: Vec::new(),
        }
    }

    /// Source first, then targets in insertion order.
    pub fn snapshots_mut(&mut self) -> impl Iterator<Item = &mut EntitySnapshot> {
        std::iter::once(&mut self.source).chain(self.targets.iter_mut())
    }
}

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Process-unique id the client assigns to every entity of a match.
pub type EntityId = u32;

/// Raw tag name -> raw tag value, exactly as logged.
pub type TagMap = HashMap<String, String>;

/// Which half of the board a player (and their cards) occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    /// Map the client's perspective keyword onto a board side.
    pub fn from_log(keyword: &str) -> Option<Side> {
        match keyword {
            "FRIENDLY" => Some(Side::Bottom),
            "OPPOSING" => Some(Side::Top),
            _ => None,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// Display hints derived from an entity's raw tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisplayTag {
    #[serde(rename = "corrupt")]
    Corrupt,
    #[serde(rename = "can-corrupt")]
    CanCorrupt,
}

const TAG_CORRUPTED: &str = "CORRUPTED";
const TAG_CORRUPT: &str = "CORRUPT";

/// Recompute display tags from a raw tag map.
///
/// A corrupted card no longer advertises that it can be corrupted.
pub fn derive_display_tags(tags: &TagMap) -> Vec<DisplayTag> {
    let is_set = |name: &str| tags.get(name).is_some_and(|v| v != "0");

    let mut derived = Vec::new();
    if is_set(TAG_CORRUPTED) {
        derived.push(DisplayTag::Corrupt);
    } else if is_set(TAG_CORRUPT) {
        derived.push(DisplayTag::CanCorrupt);
    }
    derived
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardEntity {
    pub entity_id: EntityId,
    /// Numeric id from the card table, absent until the card code is known.
    pub card_id: Option<u32>,
    /// Textual card id as logged (`CS2_029`); empty while hidden.
    pub card_code: String,
    /// Empty until resolved.
    pub card_name: String,
    pub side: Option<Side>,
    pub tags: TagMap,
}

impl CardEntity {
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            ..Default::default()
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.card_name.is_empty()
    }

    pub fn display_tags(&self) -> Vec<DisplayTag> {
        derive_display_tags(&self.tags)
    }

    pub fn with_tag(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(tag.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntity {
    pub entity_id: EntityId,
    pub player_id: Option<u32>,
    pub name: String,
    pub tags: TagMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameEntity {
    pub entity_id: EntityId,
    pub tags: TagMap,
}

/// Last-known fact about an id-addressable object of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Card(CardEntity),
    Player(PlayerEntity),
    Game(GameEntity),
}

impl Entity {
    pub fn entity_id(&self) -> EntityId {
        match self {
            Entity::Card(card) => card.entity_id,
            Entity::Player(player) => player.entity_id,
            Entity::Game(game) => game.entity_id,
        }
    }

    /// Name the entity is displayed under; empty while unresolved.
    pub fn name(&self) -> &str {
        match self {
            Entity::Card(card) => &card.card_name,
            Entity::Player(player) => &player.name,
            Entity::Game(_) => "GameEntity",
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name().is_empty()
    }

    pub fn tags(&self) -> &TagMap {
        match self {
            Entity::Card(card) => &card.tags,
            Entity::Player(player) => &player.tags,
            Entity::Game(game) => &game.tags,
        }
    }

    pub fn as_card(&self) -> Option<&CardEntity> {
        match self {
            Entity::Card(card) => Some(card),
            _ => None,
        }
    }
}

impl From<CardEntity> for Entity {
    fn from(card: CardEntity) -> Self {
        Entity::Card(card)
    }
}

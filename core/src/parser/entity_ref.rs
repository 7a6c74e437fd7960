//! Parsing of the entity references embedded in log content.
//!
//! Forms seen in the wild:
//! - `[entityName=Leper Gnome id=40 zone=PLAY zonePos=1 cardId=EX1_029 player=2]`
//! - `[id=45 cardId= type=INVALID zone=HAND zonePos=3 player=2]` (hidden)
//! - `GameEntity`, a bare numeric id, or a player name

use crate::game_data::CardDatabase;
use crate::state::{CardEntity, EntityId};

const REF_KEYS: &[&str] = &[
    "entityName",
    "name",
    "id",
    "zone",
    "zonePos",
    "cardId",
    "player",
    "type",
    "cardType",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Card(CardRef),
    Game,
    Id(EntityId),
    /// Anything else; in practice a player name.
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRef {
    pub entity_id: EntityId,
    /// Empty for hidden entities.
    pub name: String,
    pub zone: String,
    pub card_code: String,
    pub player_id: Option<u32>,
}

impl EntityRef {
    /// `None` for an empty reference or the `0` placeholder used for "no target".
    pub fn parse(text: &str) -> Option<EntityRef> {
        let text = text.trim();
        if text.is_empty() || text == "0" {
            return None;
        }
        if text == "GameEntity" {
            return Some(EntityRef::Game);
        }
        if let Ok(id) = text.parse::<EntityId>() {
            return Some(EntityRef::Id(id));
        }
        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            return CardRef::parse_fields(inner).map(EntityRef::Card);
        }
        Some(EntityRef::Named(text.to_string()))
    }

    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            EntityRef::Card(card) => Some(card.entity_id),
            EntityRef::Id(id) => Some(*id),
            EntityRef::Game | EntityRef::Named(_) => None,
        }
    }
}

impl CardRef {
    fn parse_fields(inner: &str) -> Option<CardRef> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        for token in inner.split(' ') {
            match token.split_once('=') {
                Some((key, value)) if REF_KEYS.contains(&key) => {
                    pairs.push((key, value.to_string()));
                }
                // Continuation of a value containing spaces (card names)
                _ => {
                    if let Some((_, value)) = pairs.last_mut() {
                        value.push(' ');
                        value.push_str(token);
                    }
                }
            }
        }

        let field = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        Some(CardRef {
            entity_id: field("id")?.parse().ok()?,
            name: field("entityName")
                .or_else(|| field("name"))
                .unwrap_or_default()
                .to_string(),
            zone: field("zone").unwrap_or_default().to_string(),
            card_code: field("cardId").unwrap_or_default().to_string(),
            player_id: field("player").and_then(|p| p.parse().ok()),
        })
    }

    /// Entity fact carried by this reference, named from the card table when the log omits it.
    pub fn to_fact(&self, cards: &dyn CardDatabase) -> CardEntity {
        let info = cards.card(&self.card_code);
        let card_name = if self.name.is_empty() {
            info.as_ref().map(|i| i.name.clone()).unwrap_or_default()
        } else {
            self.name.clone()
        };
        CardEntity {
            card_id: info.map(|i| i.id),
            card_code: self.card_code.clone(),
            card_name,
            ..CardEntity::new(self.entity_id)
        }
    }
}

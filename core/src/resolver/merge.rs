//! Field-by-field merge of entity facts.
//!
//! Precedence: an incoming field wins when it is set; otherwise the existing
//! value is kept. "Unset" means `None` for options and empty for strings.
//! Tag maps are unioned, incoming values winning on conflicts.

use crate::state::{CardEntity, Entity, GameEntity, PlayerEntity, TagMap};

pub fn merge_entity(existing: &Entity, incoming: Entity) -> Entity {
    match (existing, incoming) {
        (Entity::Card(old), Entity::Card(new)) => Entity::Card(merge_card(old, new)),
        (Entity::Player(old), Entity::Player(new)) => Entity::Player(merge_player(old, new)),
        (Entity::Game(old), Entity::Game(new)) => Entity::Game(GameEntity {
            entity_id: old.entity_id,
            tags: merge_tags(&old.tags, new.tags),
        }),
        // Variant changed: the newer classification is authoritative.
        (_, incoming) => incoming,
    }
}

pub fn merge_card(old: &CardEntity, new: CardEntity) -> CardEntity {
    CardEntity {
        entity_id: old.entity_id,
        card_id: new.card_id.or(old.card_id),
        card_code: non_empty_or(new.card_code, &old.card_code),
        card_name: non_empty_or(new.card_name, &old.card_name),
        side: new.side.or(old.side),
        tags: merge_tags(&old.tags, new.tags),
    }
}

fn merge_player(old: &PlayerEntity, new: PlayerEntity) -> PlayerEntity {
    PlayerEntity {
        entity_id: old.entity_id,
        player_id: new.player_id.or(old.player_id),
        name: non_empty_or(new.name, &old.name),
        tags: merge_tags(&old.tags, new.tags),
    }
}

fn merge_tags(old: &TagMap, new: TagMap) -> TagMap {
    let mut merged = old.clone();
    merged.extend(new);
    merged
}

fn non_empty_or(incoming: String, existing: &str) -> String {
    if incoming.is_empty() {
        existing.to_owned()
    } else {
        incoming
    }
}

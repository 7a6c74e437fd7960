//! Forward-reference repair.
//!
//! The client may mention an entity before its name is known (hidden cards,
//! entities created mid-block). Such ids are parked in a pending set. When a
//! later fact names the entity, everything recorded so far is patched:
//! cards get their derived tags refreshed and match-log snapshots that still
//! carry the empty name are rewritten in place.

mod merge;


use hashbrown::{HashMap, HashSet};

use crate::state::{CardEntity, DisplayTag, Entity, EntityId, GameState, MatchLogEntry, Player};

pub use merge::{merge_card, merge_entity};

/// Last-known fact per entity id plus the ids still waiting for a name.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    known: HashMap<EntityId, Entity>,
    pending: HashSet<EntityId>,
}

impl EntityResolver {
    pub fn get(&self, entity_id: EntityId) -> Option<&Entity> {
        self.known.get(&entity_id)
    }

    pub fn card(&self, entity_id: EntityId) -> Option<&CardEntity> {
        self.known.get(&entity_id).and_then(Entity::as_card)
    }

    pub fn tag(&self, entity_id: EntityId, tag: &str) -> Option<&str> {
        self.known
            .get(&entity_id)
            .and_then(|e| e.tags().get(tag))
            .map(String::as_str)
    }

    pub fn is_pending(&self, entity_id: EntityId) -> bool {
        self.pending.contains(&entity_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// Merge a fact into the resolver and propagate it into recorded state.
///
/// Returns true when observable state (cards or match log) changed.
/// Observing the same data twice is a no-op.
pub fn observe(state: &mut GameState, fact: Entity) -> bool {
    let entity_id = fact.entity_id();

    let merged = match state.entities.known.get(&entity_id) {
        Some(existing) => {
            let merged = merge_entity(existing, fact);
            if &merged == existing {
                return false;
            }
            merged
        }
        None => fact,
    };

    let mut changed = false;
    if let Entity::Card(card) = &merged {
        changed |= refresh_cards(&mut state.players, card);

        if !card.is_resolved() {
            state.entities.pending.insert(entity_id);
        } else if state.entities.pending.remove(&entity_id) {
            let patched = backfill_match_log(&mut state.match_log, card);
            tracing::debug!(
                entity_id,
                name = %card.card_name,
                patched,
                "Resolved forward reference"
            );
            changed |= patched > 0;
        }
    }

    state.entities.known.insert(entity_id, merged);
    changed
}

/// Refresh derived tags (and a missing name) on every card backed by this entity.
fn refresh_cards(players: &mut [Player], entity: &CardEntity) -> bool {
    let tags: Vec<DisplayTag> = entity.display_tags();
    let mut changed = false;

    for card in players
        .iter_mut()
        .flat_map(|p| p.cards.iter_mut())
        .filter(|c| c.entity_id == entity.entity_id)
    {
        if card.tags != tags {
            card.tags = tags.clone();
            changed = true;
        }
        if card.card_name.is_empty() && entity.is_resolved() {
            card.card_name = entity.card_name.clone();
            changed = true;
        }
    }
    changed
}

/// Rewrite snapshots that still carry the empty name. Returns how many were patched.
fn backfill_match_log(match_log: &mut [MatchLogEntry], entity: &CardEntity) -> usize {
    let mut patched = 0;
    for snapshot in match_log.iter_mut().flat_map(|entry| entry.snapshots_mut()) {
        if snapshot.resolve_from(entity) {
            patched += 1;
        }
    }
    patched
}

//! Handlers behind the standard recognizers.
//!
//! Each handler receives the named captures of one line and returns whether
//! it changed observable state. A handler that cannot act (unknown player,
//! unknown card) logs at debug and returns false.

pub(crate) mod blocks;
pub(crate) mod game;
pub(crate) mod tags;
pub(crate) mod zone;

use super::entity_ref::EntityRef;
use super::fields::LineContext;
use crate::resolver;
use crate::state::{CardEntity, Entity, EntityId, EntitySnapshot, GameState};

/// Player addressed by a log entity reference: a player name or a player entity id.
pub(crate) fn player_index(state: &GameState, entity: &str) -> Option<usize> {
    match EntityRef::parse(entity)? {
        EntityRef::Named(name) => state
            .players
            .iter()
            .position(|p| !p.name.is_empty() && p.name == name),
        EntityRef::Id(id) => state.players.iter().position(|p| p.entity_id == Some(id)),
        EntityRef::Card(_) | EntityRef::Game => None,
    }
}

/// Feed a card reference to the resolver.
///
/// Returns the entity id and whether anything changed, or `None` when the
/// reference does not denote a card (players, the game entity, "no target").
pub(crate) fn observe_card(
    text: &str,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> Option<(EntityId, bool)> {
    match EntityRef::parse(text)? {
        EntityRef::Card(card) => {
            let mut fact = card.to_fact(ctx.cards);
            fact.side = card
                .player_id
                .and_then(|id| state.player(id))
                .and_then(|p| p.position);
            let changed = resolver::observe(state, fact.into());
            Some((card.entity_id, changed))
        }
        EntityRef::Id(id) => match state.entities.get(id) {
            Some(Entity::Card(_)) => Some((id, false)),
            Some(_) => None,
            None if state.players.iter().any(|p| p.entity_id == Some(id))
                || state.game_entity_id == Some(id) =>
            {
                None
            }
            None => Some((id, resolver::observe(state, CardEntity::new(id).into()))),
        },
        EntityRef::Game | EntityRef::Named(_) => None,
    }
}

/// Snapshot of what is currently known about a card entity.
pub(crate) fn snapshot(state: &GameState, entity_id: EntityId) -> EntitySnapshot {
    state
        .entities
        .card(entity_id)
        .map(EntitySnapshot::of)
        .unwrap_or_else(|| EntitySnapshot {
            entity_id,
            ..Default::default()
        })
}

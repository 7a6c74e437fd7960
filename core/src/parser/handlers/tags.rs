//! Generic `TAG_CHANGE` routing.
//!
//! Known player and game tags update their dedicated fields. Any other tag on a
//! card entity is stored raw on the entity so derived display tags stay current.

use super::player_index;
use crate::parser::entity_ref::EntityRef;
use crate::parser::fields::{Fields, LineContext};
use crate::parser::grammar::{step, tag};
use crate::resolver;
use crate::state::{CardEntity, Entity, GameState, Mana};

pub(crate) fn tag_change(fields: &Fields<'_>, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
    let entity = fields.str("entity");
    let value = fields.str("value");

    match fields.str("tag") {
        // Owned by the turn-change and game-over recognizers
        tag::CURRENT_PLAYER | tag::PLAYSTATE => false,

        tag::RESOURCES => set_mana(state, entity, value, |m| &mut m.total),
        tag::RESOURCES_USED => set_mana(state, entity, value, |m| &mut m.used),
        tag::TEMP_RESOURCES => set_mana(state, entity, value, |m| &mut m.temporary),
        tag::OVERLOAD_OWED => set_mana(state, entity, value, |m| &mut m.overload_owed),
        tag::OVERLOAD_LOCKED => set_mana(state, entity, value, |m| &mut m.overload_locked),

        tag::TIMEOUT => {
            let (Some(idx), Ok(seconds)) = (player_index(state, entity), value.parse::<u32>()) else {
                return false;
            };
            let player = &mut state.players[idx];
            if player.timeout == Some(seconds) {
                return false;
            }
            player.timeout = Some(seconds);
            true
        }

        tag::QUEST_PROGRESS => quest_progress(state, entity, value),

        tag::MULLIGAN_STATE => {
            let Some(idx) = player_index(state, entity) else {
                return false;
            };
            match value {
                step::MULLIGAN_INPUT if !state.mulligan_active => {
                    state.mulligan_active = true;
                    true
                }
                step::MULLIGAN_DONE if !state.players[idx].mulligan_done => {
                    state.players[idx].mulligan_done = true;
                    true
                }
                _ => false,
            }
        }

        tag::STEP if value == step::BEGIN_MULLIGAN => {
            let changed = state.begin_phase_active || !state.mulligan_active;
            state.begin_phase_active = false;
            state.mulligan_active = true;
            if changed {
                tracing::debug!("Mulligan started");
            }
            changed
        }

        tag::NEXT_STEP if value == step::MAIN_READY => {
            if !state.mulligan_active {
                return false;
            }
            state.mulligan_active = false;
            tracing::debug!("Mulligan finished");
            true
        }

        other => raw_card_tag(state, entity, other, value, ctx),
    }
}

fn set_mana(state: &mut GameState, entity: &str, value: &str, field: fn(&mut Mana) -> &mut i32) -> bool {
    let (Some(idx), Ok(value)) = (player_index(state, entity), value.parse::<i32>()) else {
        return false;
    };
    let slot = field(&mut state.players[idx].mana);
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn quest_progress(state: &mut GameState, entity: &str, value: &str) -> bool {
    let (Some(entity_id), Ok(progress)) = (
        EntityRef::parse(entity).and_then(|r| r.entity_id()),
        value.parse::<u32>(),
    ) else {
        return false;
    };

    let Some(quest) = state
        .players
        .iter_mut()
        .find_map(|p| p.quest_mut(entity_id))
    else {
        tracing::debug!(entity_id, "Progress for unknown quest");
        return false;
    };
    if quest.progress == progress {
        return false;
    }
    quest.progress = progress;
    true
}

/// Store an unrouted tag on a card entity.
fn raw_card_tag(
    state: &mut GameState,
    entity: &str,
    tag: &str,
    value: &str,
    ctx: &LineContext<'_>,
) -> bool {
    let fact = match EntityRef::parse(entity) {
        Some(EntityRef::Card(card)) => card.to_fact(ctx.cards),
        Some(EntityRef::Id(id)) => match state.entities.get(id) {
            Some(Entity::Card(_)) | None => CardEntity::new(id),
            Some(_) => return false,
        },
        _ => return false,
    };
    if state.players.iter().any(|p| p.entity_id == Some(fact.entity_id))
        || state.game_entity_id == Some(fact.entity_id)
    {
        return false;
    }
    resolver::observe(state, fact.with_tag(tag, value).into())
}

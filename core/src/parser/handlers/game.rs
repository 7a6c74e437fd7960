//! Match lifecycle: start, players, scene, mulligan result, turns, game over.

use super::player_index;
use crate::parser::fields::{Fields, LineContext};
use crate::parser::grammar::DECK_SIZE;
use crate::resolver;
use crate::state::{Entity, EntityId, GameEntity, GameState, PlayStatus, PlayerEntity};

pub(crate) fn game_start(_fields: &Fields<'_>, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
    state.start(ctx.now);
    true
}

pub(crate) fn game_entity(fields: &Fields<'_>, state: &mut GameState, _ctx: &LineContext<'_>) -> bool {
    let Some(entity_id) = fields.parse::<EntityId>("entityId") else {
        return false;
    };
    if state.game_entity_id == Some(entity_id) {
        return false;
    }
    state.game_entity_id = Some(entity_id);
    resolver::observe(
        state,
        Entity::Game(GameEntity {
            entity_id,
            tags: Default::default(),
        }),
    );
    true
}

pub(crate) fn player_entity(fields: &Fields<'_>, state: &mut GameState, _ctx: &LineContext<'_>) -> bool {
    let (Some(entity_id), Some(player_id)) = (
        fields.parse::<EntityId>("entityId"),
        fields.parse::<u32>("playerId"),
    ) else {
        return false;
    };

    let known = state.player(player_id).is_some();
    let Some(player) = state.register_player(player_id) else {
        return false;
    };
    if known && player.entity_id == Some(entity_id) {
        return false;
    }
    player.entity_id = Some(entity_id);
    let name = player.name.clone();

    resolver::observe(
        state,
        Entity::Player(PlayerEntity {
            entity_id,
            player_id: Some(player_id),
            name,
            tags: Default::default(),
        }),
    );
    true
}

pub(crate) fn player_name(fields: &Fields<'_>, state: &mut GameState, _ctx: &LineContext<'_>) -> bool {
    let Some(player_id) = fields.parse::<u32>("playerId") else {
        return false;
    };
    let name = fields.str("playerName").trim();
    if name.is_empty() {
        return false;
    }

    let known = state.player(player_id).is_some();
    let Some(player) = state.register_player(player_id) else {
        return false;
    };
    if known && player.name == name {
        return false;
    }
    player.name = name.to_string();
    let entity_id = player.entity_id;
    tracing::debug!(player_id, name, "Player joined");

    if let Some(entity_id) = entity_id {
        resolver::observe(
            state,
            Entity::Player(PlayerEntity {
                entity_id,
                player_id: Some(player_id),
                name: name.to_string(),
                tags: Default::default(),
            }),
        );
    }
    true
}

pub(crate) fn loading_screen(fields: &Fields<'_>, state: &mut GameState, _ctx: &LineContext<'_>) -> bool {
    let scene = fields.str("currMode");
    if scene.is_empty() || state.scene.as_deref() == Some(scene) {
        return false;
    }
    tracing::debug!(from = fields.str("prevMode"), to = scene, "Scene changed");
    state.scene = Some(scene.to_string());
    true
}

/// `cards_replaced = DECK_SIZE - card_count - cards_left`, kept literal even when negative.
pub(crate) fn mulligan_result(fields: &Fields<'_>, state: &mut GameState, _ctx: &LineContext<'_>) -> bool {
    if !state.mulligan_active {
        return false;
    }
    let Some(cards_left) = fields.parse::<i32>("cardsLeft") else {
        return false;
    };
    let Some(idx) = player_index(state, fields.str("playerName")) else {
        tracing::debug!(name = fields.str("playerName"), "Mulligan result for unknown player");
        return false;
    };

    let player = &mut state.players[idx];
    let drawn = i32::try_from(player.card_count).unwrap_or(i32::MAX);
    let replaced = DECK_SIZE.saturating_sub(drawn).saturating_sub(cards_left);
    if player.cards_replaced_in_mulligan == Some(replaced) {
        return false;
    }
    player.cards_replaced_in_mulligan = Some(replaced);
    tracing::debug!(player_id = player.player_id, replaced, "Mulligan result");
    true
}

pub(crate) fn turn_change(fields: &Fields<'_>, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
    let Some(idx) = player_index(state, fields.str("entity")) else {
        tracing::debug!(entity = fields.str("entity"), "Turn change for unknown player");
        return false;
    };

    for (i, player) in state.players.iter_mut().enumerate() {
        if i != idx {
            player.end_turn(ctx.now);
        }
    }
    let player = &mut state.players[idx];
    player.close_last_turn(ctx.now);
    player.begin_turn(ctx.now);
    let player_id = player.player_id;

    state.turn_start_time = Some(ctx.now);
    state.turn_sequence += 1;
    tracing::debug!(player_id, turn = state.turn_sequence, "Turn changed");
    true
}

pub(crate) fn game_over(fields: &Fields<'_>, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
    if state.is_over() {
        tracing::debug!("Play state after match end ignored");
        return false;
    }
    let Some(status) = PlayStatus::from_log(fields.str("value")) else {
        return false;
    };

    if let Some(idx) = player_index(state, fields.str("entity")) {
        state.players[idx].status = Some(status);
    }
    state.game_over_count += 1;

    if state.is_over() {
        if let Some(active) = state.active_player_mut() {
            active.close_last_turn(ctx.now);
        }
        state.match_duration_ms = state
            .start_time
            .map(|start| ctx.now.signed_duration_since(start).num_milliseconds());
        tracing::info!(duration_ms = ?state.match_duration_ms, "Match finished");
    }
    true
}

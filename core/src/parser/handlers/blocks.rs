//! Multi-line records: entity definitions, actions, and discover-style choices.

use super::{observe_card, player_index, snapshot};
use crate::parser::entity_ref::EntityRef;
use crate::parser::fields::{Fields, LineContext};
use crate::parser::grammar::{CHOICE_GENERAL, tag, zone};
use crate::resolver;
use crate::state::{ActionKind, CardEntity, EntityId, GameState, MatchLogEntry};

// ─────────────────────────────────────────────────────────────────────────────
// Entity definitions (FULL_ENTITY / SHOW_ENTITY)
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn open_definition(
    fields: &Fields<'_>,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> Option<(EntityId, bool)> {
    let entity_id = match fields.parse::<EntityId>("id") {
        Some(id) => id,
        None => EntityRef::parse(fields.str("entity"))?.entity_id()?,
    };
    let card_code = fields.str("cardId");

    let mut fact = CardEntity::new(entity_id);
    if let Some(info) = ctx.cards.card(card_code) {
        fact.card_id = Some(info.id);
        fact.card_name = info.name;
    }
    fact.card_code = card_code.to_string();

    let changed = resolver::observe(state, fact.into());
    Some((entity_id, changed))
}

pub(crate) fn definition_tag(
    fields: &Fields<'_>,
    entity_id: &mut EntityId,
    state: &mut GameState,
    _ctx: &LineContext<'_>,
) -> bool {
    let fact = CardEntity::new(*entity_id).with_tag(fields.str("tag"), fields.str("value"));
    resolver::observe(state, fact.into())
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions (BLOCK_START BlockType=ATTACK|PLAY|TRIGGER)
// ─────────────────────────────────────────────────────────────────────────────

/// Appends a match-log entry; the block state is its index.
pub(crate) fn open_action(
    fields: &Fields<'_>,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> Option<(usize, bool)> {
    let kind = ActionKind::from_block_type(fields.str("blockType"))?;
    let (source_id, _) = observe_card(fields.str("source"), state, ctx)?;

    let mut entry = MatchLogEntry::new(kind, ctx.now, snapshot(state, source_id));
    if let Some((target_id, _)) = observe_card(fields.str("target"), state, ctx) {
        entry.targets.push(snapshot(state, target_id));
    }
    tracing::debug!(?kind, source_id, targets = entry.targets.len(), "Action recorded");

    state.match_log.push(entry);
    Some((state.match_log.len() - 1, true))
}

/// `DAMAGE` deltas become damage or healing; `ZONE=GRAVEYARD` marks death.
pub(crate) fn action_tag(
    fields: &Fields<'_>,
    entry_index: &mut usize,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> bool {
    let tag_name = fields.str("tag");
    let value = fields.str("value");
    let Some((entity_id, _)) = observe_card(fields.str("entity"), state, ctx) else {
        return false;
    };

    let previous_damage: i32 = state
        .entities
        .tag(entity_id, tag::DAMAGE)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    // Store the raw tag here so the delta is computed against the previous value
    resolver::observe(state, CardEntity::new(entity_id).with_tag(tag_name, value).into());

    let known = snapshot(state, entity_id);
    let Some(entry) = state.match_log.get_mut(*entry_index) else {
        return false;
    };
    let position = entry.snapshots_mut().position(|s| s.entity_id == entity_id);
    let snap = match position {
        Some(pos) => entry.snapshots_mut().nth(pos),
        None => {
            entry.targets.push(known);
            entry.targets.last_mut()
        }
    };
    let Some(snap) = snap else {
        return false;
    };

    match tag_name {
        tag::DAMAGE => {
            let Ok(current) = value.parse::<i32>() else {
                return false;
            };
            let Some(delta) = current.checked_sub(previous_damage) else {
                tracing::debug!(entity_id, current, previous_damage, "Damage delta out of range");
                return false;
            };
            let (total, amount) = match delta {
                0 => return false,
                d if d > 0 => (&mut snap.damage, Some(d)),
                d => (&mut snap.healing, d.checked_neg()),
            };
            let Some(sum) = amount.and_then(|a| total.unwrap_or(0).checked_add(a)) else {
                tracing::debug!(entity_id, delta, "Damage total out of range");
                return false;
            };
            *total = Some(sum);
            true
        }
        tag::ZONE if value == zone::GRAVEYARD => {
            let changed = !snap.dead;
            snap.dead = true;
            changed
        }
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery (entity choices / entities chosen)
// ─────────────────────────────────────────────────────────────────────────────

/// Opens a choice for `ChoiceType=GENERAL`; the block state is the player id.
pub(crate) fn open_choices(
    fields: &Fields<'_>,
    state: &mut GameState,
    _ctx: &LineContext<'_>,
) -> Option<(u32, bool)> {
    if fields.str("choiceType") != CHOICE_GENERAL {
        return None;
    }
    let idx = player_index(state, fields.str("playerName"))?;
    let player = &mut state.players[idx];
    player.discovery.begin();
    Some((player.player_id, true))
}

pub(crate) fn choice_line(
    fields: &Fields<'_>,
    player_id: &mut u32,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> bool {
    let (text, is_source) = match fields.get("source") {
        Some(source) => (source, true),
        None => (fields.str("option"), false),
    };
    let Some((entity_id, _)) = observe_card(text, state, ctx) else {
        return false;
    };
    let snap = snapshot(state, entity_id);
    let Some(player) = state.player_mut(*player_id) else {
        return false;
    };

    if is_source {
        player.discovery.source = Some(snap);
    } else {
        player.discovery.options.push(snap);
    }
    true
}

/// Follows a choice the player made; declines during the mulligan and when no choice is open.
pub(crate) fn open_chosen(
    fields: &Fields<'_>,
    state: &mut GameState,
    _ctx: &LineContext<'_>,
) -> Option<(u32, bool)> {
    if state.mulligan_active {
        return None;
    }
    let idx = player_index(state, fields.str("playerName"))?;
    let player = &state.players[idx];
    player.discovery.active.then_some((player.player_id, false))
}

pub(crate) fn chosen_line(
    fields: &Fields<'_>,
    player_id: &mut u32,
    state: &mut GameState,
    ctx: &LineContext<'_>,
) -> bool {
    let Some((entity_id, _)) = observe_card(fields.str("entity"), state, ctx) else {
        return false;
    };
    let snap = snapshot(state, entity_id);
    let Some(player) = state.player_mut(*player_id) else {
        return false;
    };
    if !player.discovery.active {
        return false;
    }
    player.discovery.chosen = Some(snap);
    player.discovery.active = false;
    true
}

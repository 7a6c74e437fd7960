//! Zone transitions: the card collections, secrets and quests, draw counting.

use crate::game_data::SecretKind;
use crate::parser::entity_ref::EntityRef;
use crate::parser::fields::{Fields, LineContext};
use crate::parser::grammar::zone;
use crate::resolver;
use crate::state::{Card, CardState, GameState, Quest, Secret, Side};

/// Split `FRIENDLY HAND` into its side keyword and zone; either may be absent.
fn split_side(text: &str) -> (Option<Side>, &str) {
    let text = text.trim();
    match text.split_once(' ') {
        Some((keyword, rest)) if Side::from_log(keyword).is_some() => {
            (Side::from_log(keyword), rest.trim())
        }
        _ => match Side::from_log(text) {
            Some(side) => (Some(side), ""),
            None => (None, text),
        },
    }
}

pub(crate) fn zone_change(fields: &Fields<'_>, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
    let Some(EntityRef::Card(card_ref)) = EntityRef::parse(fields.str("entity")) else {
        return false;
    };
    let Some(controller_id) = card_ref.player_id else {
        return false;
    };
    let entity_id = card_ref.entity_id;
    let (from_side, from_zone) = split_side(fields.str("from"));
    let (to_side, to_zone) = split_side(fields.str("to"));

    let mut changed = false;

    // Positions come from the side keyword alone, so hidden opposing cards count too
    if state.mulligan_active
        && (to_zone == zone::HAND || to_zone == zone::DECK)
        && let Some(side) = to_side
    {
        changed |= state.observe_mulligan_side(controller_id, side);
    }

    let Some(info) = ctx.cards.card(&card_ref.card_code) else {
        tracing::debug!(
            entity_id,
            card_code = %card_ref.card_code,
            "Zone change for unknown card"
        );
        return changed;
    };

    // Controller changed: the entity leaves the previous holder's collection
    if let Some(holder) = state.holder_index(entity_id)
        && state.players[holder].player_id != controller_id
    {
        state.players[holder].take_card(entity_id);
        changed = true;
    }
    if from_zone.starts_with(zone::SECRET) {
        for player in &mut state.players {
            changed |= player.remove_secret_records(entity_id);
        }
    }

    let begin_phase = state.begin_phase_active;
    let tags = state
        .entities
        .card(entity_id)
        .map(|c| c.display_tags())
        .unwrap_or_default();
    let card_name = if card_ref.name.is_empty() {
        info.name.clone()
    } else {
        card_ref.name.clone()
    };

    let Some(player) = state.register_player(controller_id) else {
        return changed;
    };

    let card_state = CardState::from_zone(to_zone);
    match player.card_mut(entity_id) {
        Some(card) => {
            if card.state != card_state {
                card.state = card_state;
                changed = true;
            }
            if card.card_code != card_ref.card_code {
                card.card_id = info.id;
                card.card_code = card_ref.card_code.clone();
                card.card_name = card_name;
                changed = true;
            }
        }
        None => {
            player.cards.push(Card {
                entity_id,
                card_id: info.id,
                card_code: card_ref.card_code.clone(),
                card_name,
                state: card_state,
                is_spawned_card: !(begin_phase && card_state == CardState::Deck),
                tags,
            });
            changed = true;
        }
    }

    if to_zone.starts_with(zone::SECRET) {
        match ctx.cards.secret(&card_ref.card_code) {
            Some(SecretKind::Secret { class }) => {
                if !player.secrets.iter().any(|s| s.entity_id == entity_id) {
                    player.secrets.push(Secret {
                        entity_id,
                        card_code: card_ref.card_code.clone(),
                        card_class: class,
                    });
                    changed = true;
                }
            }
            Some(SecretKind::Quest { requirement }) => {
                if player.quest_mut(entity_id).is_none() {
                    player.quests.push(Quest {
                        entity_id,
                        card_code: card_ref.card_code.clone(),
                        progress: 0,
                        requirement,
                    });
                    changed = true;
                }
            }
            None => {
                tracing::debug!(entity_id, card_code = %card_ref.card_code, "No secret metadata");
            }
        }
    }

    // Opening hand included: the mulligan result subtracts everything drawn so far
    if from_zone == zone::DECK && to_zone == zone::HAND {
        player.card_count = player.card_count.saturating_add(1);
        changed = true;
    }

    let mut fact = card_ref.to_fact(ctx.cards);
    fact.side = to_side.or(from_side);
    changed |= resolver::observe(state, fact.into());
    changed
}

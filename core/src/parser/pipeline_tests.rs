use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::Pipeline;
use crate::game_data::CardTable;
use crate::state::{ActionKind, CardState, DisplayTag, GameState, PlayStatus, Side};

fn at(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        + Duration::seconds(secs)
}

fn cards() -> CardTable {
    let mut table = CardTable::new();
    table
        .insert("CS2_029", 315, "Fireball")
        .insert("EX1_029", 658, "Leper Gnome")
        .insert("CS2_182", 1650, "Chillwind Yeti")
        .insert("EX1_277", 564, "Arcane Missiles")
        .insert_secret("EX1_130", 1004, "Noble Sacrifice", "PALADIN")
        .insert_quest("UNG_940", 41499, "Awaken the Makers", 7);
    table
}

fn power(indent: usize, content: &str) -> String {
    format!("[Power] GameState.DebugPrintPower() -{}{content}", " ".repeat(indent))
}

fn game(content: &str) -> String {
    format!("[Power] GameState.DebugPrintGame() - {content}")
}

fn choices(indent: usize, content: &str) -> String {
    format!(
        "[Power] GameState.DebugPrintEntityChoices() -{}{content}",
        " ".repeat(indent)
    )
}

fn chosen(indent: usize, content: &str) -> String {
    format!(
        "[Power] GameState.DebugPrintEntitiesChosen() -{}{content}",
        " ".repeat(indent)
    )
}

fn zone(content: &str) -> String {
    format!("[Zone] ZoneChangeList.ProcessChanges() - {content}")
}

fn card_ref(name: &str, id: u32, zone: &str, code: &str, player: u32) -> String {
    format!("[entityName={name} id={id} zone={zone} zonePos=1 cardId={code} player={player}]")
}

fn hidden_ref(id: u32, zone: &str, player: u32) -> String {
    format!("[id={id} cardId= type=INVALID zone={zone} zonePos=0 player={player}]")
}

fn move_card(entity: &str, from: &str, to: &str) -> String {
    zone(&format!("id=1 local=False {entity} zone from {from} -> {to}"))
}

struct Harness {
    pipeline: Pipeline,
    state: GameState,
}

impl Harness {
    fn new() -> Self {
        Self {
            pipeline: Pipeline::standard(Arc::new(cards())).unwrap(),
            state: GameState::new(),
        }
    }

    fn feed(&mut self, secs: i64, line: &str) -> bool {
        self.pipeline
            .process_line_at(line, &mut self.state, at(secs))
    }

    /// CREATE_GAME plus both players with entity ids and names.
    fn start_match(&mut self) {
        self.feed(0, &power(1, "CREATE_GAME"));
        self.feed(0, &power(4, "GameEntity EntityID=1"));
        self.feed(0, &power(4, "Player EntityID=2 PlayerID=1 GameAccountId=[hi=1 lo=2]"));
        self.feed(0, &power(4, "Player EntityID=3 PlayerID=2 GameAccountId=[hi=3 lo=4]"));
        self.feed(0, &game("PlayerID=1, PlayerName=Alice#1"));
        self.feed(0, &game("PlayerID=2, PlayerName=Bob#2"));
    }

    fn begin_mulligan(&mut self) {
        self.feed(1, &power(1, "TAG_CHANGE Entity=GameEntity tag=STEP value=BEGIN_MULLIGAN"));
    }

    fn finish_mulligan(&mut self) {
        self.begin_mulligan();
        self.feed(5, &power(1, "TAG_CHANGE Entity=GameEntity tag=NEXT_STEP value=MAIN_READY"));
    }

    fn holders(&self, entity_id: u32) -> usize {
        self.state
            .players
            .iter()
            .filter(|p| p.card(entity_id).is_some())
            .count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Match lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn match_start_registers_players() {
    let mut h = Harness::new();
    h.start_match();

    let state = &h.state;
    assert_eq!(state.start_time, Some(at(0)));
    assert!(state.begin_phase_active);
    assert_eq!(state.game_entity_id, Some(1));
    assert_eq!(state.players.len(), 2);
    assert_eq!(state.player(1).unwrap().name, "Alice#1");
    assert_eq!(state.player(1).unwrap().entity_id, Some(2));
    assert_eq!(state.player(2).unwrap().name, "Bob#2");
    assert_eq!(state.player(2).unwrap().entity_id, Some(3));
}

#[test]
fn third_player_is_rejected() {
    let mut h = Harness::new();
    h.start_match();

    assert!(!h.feed(1, &game("PlayerID=3, PlayerName=Eve#3")));
    assert_eq!(h.state.players.len(), 2);
    assert!(h.state.player_by_name("Eve#3").is_none());
}

#[test]
fn new_match_discards_previous_one() {
    let mut h = Harness::new();
    h.start_match();
    h.feed(10, &power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=1"));

    h.feed(100, &power(1, "CREATE_GAME"));
    assert!(h.state.players.is_empty());
    assert_eq!(h.state.turn_sequence, 0);
    assert_eq!(h.state.start_time, Some(at(100)));
}

#[test]
fn loading_screen_records_scene() {
    let mut h = Harness::new();
    let line = "[LoadingScreen] LoadingScreen.OnSceneLoaded() - prevMode=HUB currMode=GAMEPLAY";

    assert!(h.feed(0, line));
    assert_eq!(h.state.scene.as_deref(), Some("GAMEPLAY"));
    assert!(!h.feed(1, line));
}

// ─────────────────────────────────────────────────────────────────────────────
// Mulligan
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn mulligan_replaced_count_uses_literal_formula() {
    let mut h = Harness::new();
    h.start_match();
    h.begin_mulligan();
    assert!(h.state.mulligan_active);
    assert!(!h.state.begin_phase_active);

    assert!(h.feed(2, &chosen(1, "id=1 Player=Alice#1 EntitiesCount=27")));
    assert_eq!(h.state.player(1).unwrap().cards_replaced_in_mulligan, Some(3));
}

#[test]
fn mulligan_result_ignored_outside_mulligan() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    assert!(!h.feed(6, &chosen(1, "id=1 Player=Alice#1 EntitiesCount=27")));
    assert_eq!(h.state.player(1).unwrap().cards_replaced_in_mulligan, None);
}

#[test]
fn positions_derive_from_mulligan_zone_changes() {
    let mut h = Harness::new();
    h.start_match();
    h.begin_mulligan();

    h.feed(
        2,
        &move_card(
            &card_ref("Fireball", 40, "DECK", "CS2_029", 1),
            "FRIENDLY HAND",
            "FRIENDLY DECK",
        ),
    );
    assert!(h.state.player(1).unwrap().position.is_none());

    // Hidden opposing card: no card-table hit, positions still assigned
    assert!(h.feed(
        3,
        &move_card(&hidden_ref(45, "DECK", 2), "OPPOSING HAND", "OPPOSING DECK")
    ));
    assert_eq!(h.state.player(1).unwrap().position, Some(Side::Bottom));
    assert_eq!(h.state.player(2).unwrap().position, Some(Side::Top));
    assert_eq!(h.state.player_at(Side::Bottom).unwrap().name, "Alice#1");
    assert!(h.state.player(2).unwrap().cards.is_empty());
}

#[test]
fn mulligan_state_tracks_players() {
    let mut h = Harness::new();
    h.start_match();
    h.begin_mulligan();

    assert!(h.feed(2, &power(1, "TAG_CHANGE Entity=Bob#2 tag=MULLIGAN_STATE value=DONE")));
    assert!(h.state.player(2).unwrap().mulligan_done);
    assert!(!h.state.player(1).unwrap().mulligan_done);

    h.feed(5, &power(1, "TAG_CHANGE Entity=GameEntity tag=NEXT_STEP value=MAIN_READY"));
    assert!(!h.state.mulligan_active);
}

// ─────────────────────────────────────────────────────────────────────────────
// Turns and game over
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn turn_change_hands_over_exactly_one_turn() {
    let mut h = Harness::new();
    h.start_match();

    assert!(h.feed(10, &power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=1")));
    assert!(h.feed(40, &power(1, "TAG_CHANGE Entity=Bob#2 tag=CURRENT_PLAYER value=1")));

    let state = &h.state;
    assert_eq!(state.players.iter().filter(|p| p.turn).count(), 1);
    assert_eq!(state.active_player().unwrap().player_id, 2);
    let alice = state.player(1).unwrap();
    let bob = state.player(2).unwrap();
    assert!(!alice.turn);
    assert_eq!(alice.last_turn().unwrap().duration_ms, Some(30_000));
    assert!(bob.turn);
    assert_eq!(bob.last_turn().unwrap().start, at(40));
    assert_eq!(bob.last_turn().unwrap().duration_ms, None);
    assert_eq!(state.turn_start_time, Some(at(40)));
    assert_eq!(state.turn_sequence, 2);
}

#[test]
fn turn_change_by_player_entity_id() {
    let mut h = Harness::new();
    h.start_match();

    assert!(h.feed(10, &power(1, "TAG_CHANGE Entity=3 tag=CURRENT_PLAYER value=1")));
    assert!(h.state.player(2).unwrap().turn);
}

#[test]
fn ending_the_turn_is_not_a_turn_change() {
    let mut h = Harness::new();
    h.start_match();
    h.feed(10, &power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=1"));

    assert!(!h.feed(20, &power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=0")));
    assert_eq!(h.state.turn_sequence, 1);
}

#[test]
fn second_play_state_finishes_match_once() {
    let mut h = Harness::new();
    h.start_match();
    h.feed(10, &power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=1"));

    assert!(h.feed(100, &power(1, "TAG_CHANGE Entity=Alice#1 tag=PLAYSTATE value=WON")));
    assert_eq!(h.state.game_over_count, 1);
    assert_eq!(h.state.match_duration_ms, None);

    assert!(h.feed(101, &power(1, "TAG_CHANGE Entity=Bob#2 tag=PLAYSTATE value=LOST")));
    assert_eq!(h.state.game_over_count, 2);
    assert_eq!(h.state.match_duration_ms, Some(101_000));
    assert_eq!(h.state.player(1).unwrap().status, Some(PlayStatus::Won));
    assert_eq!(h.state.player(2).unwrap().status, Some(PlayStatus::Lost));
    assert_eq!(
        h.state.player(1).unwrap().last_turn().unwrap().duration_ms,
        Some(91_000)
    );

    // Third status: nothing moves
    assert!(!h.feed(200, &power(1, "TAG_CHANGE Entity=Alice#1 tag=PLAYSTATE value=TIED")));
    assert_eq!(h.state.game_over_count, 2);
    assert_eq!(h.state.match_duration_ms, Some(101_000));
    assert_eq!(h.state.player(1).unwrap().status, Some(PlayStatus::Won));
}

// ─────────────────────────────────────────────────────────────────────────────
// Zones
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn starting_deck_cards_are_not_spawned() {
    let mut h = Harness::new();
    h.start_match();

    assert!(h.feed(
        0,
        &move_card(&card_ref("Fireball", 40, "DECK", "CS2_029", 1), "", "FRIENDLY DECK")
    ));
    let card = h.state.player(1).unwrap().card(40).unwrap();
    assert!(!card.is_spawned_card);
    assert_eq!(card.state, CardState::Deck);
    assert_eq!(card.card_id, 315);

    h.finish_mulligan();
    h.feed(
        20,
        &move_card(&card_ref("Leper Gnome", 41, "DECK", "EX1_029", 1), "", "FRIENDLY DECK"),
    );
    assert!(h.state.player(1).unwrap().card(41).unwrap().is_spawned_card);
}

#[test]
fn every_draw_is_counted() {
    let mut h = Harness::new();
    h.start_match();
    let fireball = card_ref("Fireball", 40, "HAND", "CS2_029", 1);

    // Opening hand counts as drawn
    assert!(h.feed(0, &move_card(&fireball, "FRIENDLY DECK", "FRIENDLY HAND")));
    assert_eq!(h.state.player(1).unwrap().card_count, 1);

    h.finish_mulligan();
    let gnome = card_ref("Leper Gnome", 41, "HAND", "EX1_029", 1);
    assert!(h.feed(20, &move_card(&gnome, "FRIENDLY DECK", "FRIENDLY HAND")));
    let alice = h.state.player(1).unwrap();
    assert_eq!(alice.card_count, 2);
    assert_eq!(alice.card(41).unwrap().state, CardState::Hand);

    // Played from hand: not a draw
    let gnome = card_ref("Leper Gnome", 41, "PLAY", "EX1_029", 1);
    h.feed(21, &move_card(&gnome, "FRIENDLY HAND", "FRIENDLY PLAY"));
    assert_eq!(h.state.player(1).unwrap().card_count, 2);
}

#[test]
fn mulligan_result_subtracts_opening_draws() {
    let mut h = Harness::new();
    h.start_match();
    for (i, (name, code)) in [("Fireball", "CS2_029"), ("Leper Gnome", "EX1_029"), ("Chillwind Yeti", "CS2_182")]
        .into_iter()
        .enumerate()
    {
        let card = card_ref(name, 40 + i as u32, "HAND", code, 1);
        h.feed(0, &move_card(&card, "FRIENDLY DECK", "FRIENDLY HAND"));
    }
    h.begin_mulligan();

    assert!(h.feed(2, &chosen(1, "id=1 Player=Alice#1 EntitiesCount=28")));
    let alice = h.state.player(1).unwrap();
    assert_eq!(alice.card_count, 3);
    assert_eq!(alice.cards_replaced_in_mulligan, Some(-1));
    assert_eq!(alice.cards_in(CardState::Hand).count(), 3);
}

#[test]
fn entity_has_one_holder_after_controller_change() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    h.feed(
        20,
        &move_card(
            &card_ref("Leper Gnome", 60, "HAND", "EX1_029", 1),
            "FRIENDLY DECK",
            "FRIENDLY HAND",
        ),
    );
    assert_eq!(h.holders(60), 1);

    assert!(h.feed(
        30,
        &move_card(
            &card_ref("Leper Gnome", 60, "PLAY", "EX1_029", 2),
            "FRIENDLY HAND",
            "OPPOSING PLAY",
        )
    ));
    assert_eq!(h.holders(60), 1);
    assert!(h.state.player(1).unwrap().card(60).is_none());
    assert_eq!(
        h.state.player(2).unwrap().card(60).unwrap().state,
        CardState::Others
    );
}

#[test]
fn unknown_card_is_a_soft_miss() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    assert!(!h.feed(
        20,
        &move_card(
            &card_ref("Mystery", 90, "HAND", "NOPE_001", 1),
            "FRIENDLY DECK",
            "FRIENDLY HAND",
        )
    ));
    assert!(h.state.player(1).unwrap().cards.is_empty());
}

#[test]
fn secrets_live_while_in_secret_zone() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let secret = card_ref("Noble Sacrifice", 50, "SECRET", "EX1_130", 1);
    assert!(h.feed(20, &move_card(&secret, "FRIENDLY HAND", "FRIENDLY SECRET")));
    let alice = h.state.player(1).unwrap();
    assert_eq!(alice.secrets.len(), 1);
    assert_eq!(alice.secrets[0].card_class, "PALADIN");
    assert_eq!(alice.card(50).unwrap().state, CardState::Others);

    assert!(h.feed(30, &move_card(&secret, "FRIENDLY SECRET", "FRIENDLY GRAVEYARD")));
    assert!(h.state.player(1).unwrap().secrets.is_empty());
}

#[test]
fn quest_progress_updates_record() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let quest = card_ref("Awaken the Makers", 51, "SECRET", "UNG_940", 1);
    h.feed(20, &move_card(&quest, "FRIENDLY HAND", "FRIENDLY SECRET"));
    let record = &h.state.player(1).unwrap().quests[0];
    assert_eq!(record.requirement, 7);
    assert_eq!(record.progress, 0);

    assert!(h.feed(
        30,
        &power(1, &format!("TAG_CHANGE Entity={quest} tag=QUEST_PROGRESS value=3"))
    ));
    assert_eq!(h.state.player(1).unwrap().quests[0].progress, 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn mana_tags_update_player() {
    let mut h = Harness::new();
    h.start_match();

    assert!(h.feed(10, &power(1, "TAG_CHANGE Entity=Alice#1 tag=RESOURCES value=5")));
    assert!(h.feed(11, &power(1, "TAG_CHANGE Entity=Alice#1 tag=RESOURCES_USED value=2")));
    assert!(h.feed(12, &power(1, "TAG_CHANGE Entity=Alice#1 tag=OVERLOAD_LOCKED value=1")));
    assert!(h.feed(13, &power(1, "TAG_CHANGE Entity=Alice#1 tag=TIMEOUT value=75")));
    // Same value again is not a change
    assert!(!h.feed(14, &power(1, "TAG_CHANGE Entity=Alice#1 tag=RESOURCES value=5")));

    let alice = h.state.player(1).unwrap();
    assert_eq!(alice.mana.total, 5);
    assert_eq!(alice.mana.available(), 2);
    assert_eq!(alice.timeout, Some(75));
}

#[test]
fn raw_card_tags_refresh_display_tags() {
    let mut h = Harness::new();
    h.start_match();
    let fireball = card_ref("Fireball", 40, "HAND", "CS2_029", 1);
    h.feed(0, &move_card(&fireball, "FRIENDLY DECK", "FRIENDLY HAND"));

    assert!(h.feed(10, &power(1, &format!("TAG_CHANGE Entity={fireball} tag=CORRUPT value=1"))));
    assert_eq!(
        h.state.player(1).unwrap().card(40).unwrap().tags,
        vec![DisplayTag::CanCorrupt]
    );
    assert_eq!(h.state.entities.tag(40, "CORRUPT"), Some("1"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn attack_records_damage_and_backfills_hidden_target() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let gnome = card_ref("Leper Gnome", 60, "PLAY", "EX1_029", 1);
    let hidden = hidden_ref(70, "PLAY", 2);

    assert!(h.feed(
        30,
        &power(
            4,
            &format!(
                "BLOCK_START BlockType=ATTACK Entity={gnome} EffectCardId=System.Collections.Generic.List`1[System.String] EffectIndex=-1 Target={hidden} SubOption=-1 "
            ),
        )
    ));
    assert!(h.feed(30, &power(8, &format!("TAG_CHANGE Entity={hidden} tag=DAMAGE value=2"))));
    assert!(h.feed(30, &power(8, &format!("TAG_CHANGE Entity={hidden} tag=ZONE value=GRAVEYARD"))));
    h.feed(30, &power(4, "BLOCK_END"));

    // Outside the block: no longer attributed to the attack
    h.feed(31, &power(8, &format!("TAG_CHANGE Entity={hidden} tag=DAMAGE value=5")));

    let entry = &h.state.match_log[0];
    assert_eq!(h.state.match_log.len(), 1);
    assert_eq!(entry.kind, ActionKind::Attack);
    assert_eq!(entry.timestamp, at(30));
    assert_eq!(entry.source.card_name, "Leper Gnome");
    assert_eq!(entry.targets.len(), 1);
    assert!(entry.targets[0].is_unresolved());
    assert_eq!(entry.targets[0].damage, Some(2));
    assert!(entry.targets[0].dead);
    assert!(h.state.entities.is_pending(70));

    // The hidden entity is revealed later
    assert!(h.feed(
        40,
        &power(4, &format!("SHOW_ENTITY - Updating Entity={hidden} CardID=CS2_182"))
    ));
    let target = &h.state.match_log[0].targets[0];
    assert_eq!(target.card_name, "Chillwind Yeti");
    assert_eq!(target.card_code, "CS2_182");
    assert_eq!(target.card_id, Some(1650));
    assert!(!h.state.entities.is_pending(70));
}

#[test]
fn damage_decrease_is_healing() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let yeti = card_ref("Chillwind Yeti", 61, "PLAY", "CS2_182", 2);
    h.feed(20, &power(1, &format!("TAG_CHANGE Entity={yeti} tag=DAMAGE value=3")));

    let gnome = card_ref("Leper Gnome", 60, "PLAY", "EX1_029", 1);
    h.feed(
        30,
        &power(
            4,
            &format!("BLOCK_START BlockType=TRIGGER Entity={gnome} EffectCardId= EffectIndex=0 Target=0 SubOption=-1"),
        ),
    );
    assert!(h.feed(30, &power(8, &format!("TAG_CHANGE Entity={yeti} tag=DAMAGE value=1"))));

    let entry = &h.state.match_log[0];
    assert_eq!(entry.kind, ActionKind::Trigger);
    assert_eq!(entry.targets[0].entity_id, 61);
    assert_eq!(entry.targets[0].healing, Some(2));
    assert_eq!(entry.targets[0].damage, None);
}

#[test]
fn out_of_range_damage_is_ignored() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let gnome = card_ref("Leper Gnome", 60, "PLAY", "EX1_029", 1);
    let yeti = card_ref("Chillwind Yeti", 61, "PLAY", "CS2_182", 2);
    h.feed(
        30,
        &power(
            4,
            &format!("BLOCK_START BlockType=ATTACK Entity={gnome} EffectCardId= EffectIndex=-1 Target={yeti} SubOption=-1"),
        ),
    );
    h.feed(30, &power(8, &format!("TAG_CHANGE Entity={yeti} tag=DAMAGE value=-2147483648")));
    h.feed(30, &power(8, &format!("TAG_CHANGE Entity={yeti} tag=DAMAGE value=2147483647")));

    let target = &h.state.match_log[0].targets[0];
    assert_eq!(target.damage, None);
    assert_eq!(target.healing, None);

    // The stored value still serves as the baseline for the next delta
    assert!(h.feed(30, &power(8, &format!("TAG_CHANGE Entity={yeti} tag=DAMAGE value=2147483646"))));
    assert_eq!(h.state.match_log[0].targets[0].healing, Some(1));
}

#[test]
fn action_from_player_entity_is_declined() {
    let mut h = Harness::new();
    h.start_match();

    assert!(!h.feed(
        30,
        &power(
            4,
            "BLOCK_START BlockType=TRIGGER Entity=Alice#1 EffectCardId= EffectIndex=0 Target=0 SubOption=-1"
        )
    ));
    assert!(h.state.match_log.is_empty());
}

#[test]
fn full_entity_children_store_tags() {
    let mut h = Harness::new();
    h.start_match();

    h.feed(0, &power(4, "FULL_ENTITY - Creating ID=40 CardID=CS2_029"));
    h.feed(0, &power(8, "tag=COST value=4"));
    h.feed(0, &power(8, "tag=CORRUPTED value=1"));

    let card = h.state.entities.card(40).unwrap();
    assert_eq!(card.card_name, "Fireball");
    assert_eq!(h.state.entities.tag(40, "COST"), Some("4"));
    assert_eq!(card.display_tags(), vec![DisplayTag::Corrupt]);
}

#[test]
fn discovery_tracks_options_and_pick() {
    let mut h = Harness::new();
    h.start_match();
    h.finish_mulligan();

    let missiles = card_ref("Arcane Missiles", 80, "PLAY", "EX1_277", 1);
    let fireball = card_ref("Fireball", 81, "SETASIDE", "CS2_029", 1);
    let gnome = card_ref("Leper Gnome", 82, "SETASIDE", "EX1_029", 1);

    assert!(h.feed(
        30,
        &choices(1, "id=3 Player=Alice#1 TaskList=5 ChoiceType=GENERAL CountMin=1 CountMax=1")
    ));
    h.feed(30, &choices(3, &format!("Source={missiles}")));
    h.feed(30, &choices(3, &format!("Entities[0]={fireball}")));
    h.feed(30, &choices(3, &format!("Entities[1]={gnome}")));

    let discovery = &h.state.player(1).unwrap().discovery;
    assert!(discovery.active);
    assert_eq!(discovery.source.as_ref().unwrap().card_name, "Arcane Missiles");
    assert_eq!(discovery.options.len(), 2);

    h.feed(35, &chosen(1, "id=3 Player=Alice#1 EntitiesCount=1"));
    assert!(h.feed(35, &chosen(3, &format!("Entities[0]={fireball}"))));

    let discovery = &h.state.player(1).unwrap().discovery;
    assert!(!discovery.active);
    assert_eq!(discovery.chosen.as_ref().unwrap().entity_id, 81);
    assert_eq!(discovery.chosen.as_ref().unwrap().card_name, "Fireball");
}

#[test]
fn mulligan_choice_is_not_a_discovery() {
    let mut h = Harness::new();
    h.start_match();
    h.begin_mulligan();

    assert!(!h.feed(
        2,
        &choices(1, "id=1 Player=Alice#1 TaskList= ChoiceType=MULLIGAN CountMin=0 CountMax=3")
    ));
    assert!(!h.state.player(1).unwrap().discovery.active);
}

// ─────────────────────────────────────────────────────────────────────────────
// Batches
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn batch_outcome_flags_turn_boundaries() {
    let mut h = Harness::new();
    h.start_match();

    let outcome = h.pipeline.process_batch(
        &[power(1, "TAG_CHANGE Entity=Alice#1 tag=RESOURCES value=1")],
        &mut h.state,
    );
    assert!(outcome.changed);
    assert!(!outcome.turn_changed);

    let outcome = h.pipeline.process_batch(
        &[power(1, "TAG_CHANGE Entity=Alice#1 tag=CURRENT_PLAYER value=1")],
        &mut h.state,
    );
    assert!(outcome.changed);
    assert!(outcome.turn_changed);

    let outcome = h
        .pipeline
        .process_batch(&["unrelated noise".to_string()], &mut h.state);
    assert!(!outcome.changed);
    assert!(!outcome.turn_changed);
}

#[test]
fn standard_pipeline_order() {
    let pipeline = Pipeline::standard(Arc::new(CardTable::new())).unwrap();
    let names: Vec<_> = pipeline.names().collect();
    assert_eq!(names.first(), Some(&"game-start"));
    let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
    assert!(pos("turn-change") < pos("tag-change"));
    assert!(pos("game-over") < pos("tag-change"));
    assert!(pos("action") < pos("tag-change"));
    assert!(pos("mulligan-result") < pos("entities-chosen"));
    assert_eq!(names.len(), 14);
}

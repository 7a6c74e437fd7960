use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use super::block::BlockParser;
use super::fields::LineContext;
use super::grammar::{self, label};
use super::handlers::{blocks, game, tags, zone};
use super::pattern::{PatternParser, Recognizer};
use crate::game_data::CardDatabase;
use crate::state::GameState;

/// What a batch did to the state, as far as notification is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub changed: bool,
    pub turn_changed: bool,
}

/// Ordered recognizer list plus the card table handlers consult.
///
/// Every line is offered to every recognizer in order; several may act on the
/// same line. The order matters where two recognizers touch the same state:
///
/// - `game-start` runs first since it resets the state.
/// - `turn-change` and `game-over` own tags the generic `tag-change` skips.
/// - `mulligan-result` and `entities-chosen` share a start line; the block
///   declines while the mulligan runs.
/// - `action` reads the previous `DAMAGE` value before `tag-change` stores the new one.
pub struct Pipeline {
    recognizers: Vec<Box<dyn Recognizer>>,
    cards: Arc<dyn CardDatabase>,
}

impl Pipeline {
    pub fn new(cards: Arc<dyn CardDatabase>) -> Self {
        Self {
            recognizers: Vec::new(),
            cards,
        }
    }

    pub fn push(&mut self, recognizer: impl Recognizer + 'static) -> &mut Self {
        self.recognizers.push(Box::new(recognizer));
        self
    }

    /// The full recognizer set for the client log.
    pub fn standard(cards: Arc<dyn CardDatabase>) -> Result<Self, regex::Error> {
        let mut pipeline = Self::new(cards);
        pipeline
            .push(PatternParser::new(
                "game-start",
                label::POWER,
                grammar::CREATE_GAME,
                game::game_start,
            )?)
            .push(PatternParser::new(
                "game-entity",
                label::POWER,
                r"GameEntity EntityID=(?P<entityId>\d+)",
                game::game_entity,
            )?)
            .push(PatternParser::new(
                "player-entity",
                label::POWER,
                r"Player EntityID=(?P<entityId>\d+) PlayerID=(?P<playerId>\d+)",
                game::player_entity,
            )?)
            .push(PatternParser::new(
                "player-name",
                label::GAME,
                r"PlayerID=(?P<playerId>\d+), PlayerName=(?P<playerName>.+)",
                game::player_name,
            )?)
            .push(PatternParser::new(
                "loading-screen",
                label::LOADING_SCREEN,
                r"prevMode=(?P<prevMode>\w+) currMode=(?P<currMode>\w+)",
                game::loading_screen,
            )?)
            .push(PatternParser::new(
                "mulligan-result",
                label::CHOSEN,
                r"id=\d+ Player=(?P<playerName>.+?) EntitiesCount=(?P<cardsLeft>\d+)",
                game::mulligan_result,
            )?)
            .push(PatternParser::new(
                "turn-change",
                label::POWER,
                r"TAG_CHANGE Entity=(?P<entity>.+?) tag=CURRENT_PLAYER value=1(?:\s|$)",
                game::turn_change,
            )?)
            .push(PatternParser::new(
                "game-over",
                label::POWER,
                r"TAG_CHANGE Entity=(?P<entity>.+?) tag=PLAYSTATE value=(?P<value>WON|LOST|TIED)",
                game::game_over,
            )?)
            .push(PatternParser::new(
                "zone-change",
                label::ZONE,
                r"id=\d+ local=\w+ (?P<entity>\[.*\]) zone from(?P<from>.*?)->(?P<to>.*)",
                zone::zone_change,
            )?)
            .push(BlockParser::new(
                "action",
                label::POWER,
                r"BLOCK_START BlockType=(?P<blockType>\w+) Entity=(?P<source>.+?) EffectCardId=.*? Target=(?P<target>.+?) SubOption=",
                r"TAG_CHANGE Entity=(?P<entity>.+?) tag=(?P<tag>DAMAGE|ZONE) value=(?P<value>\S+)",
                4,
                blocks::open_action,
                blocks::action_tag,
            )?)
            .push(PatternParser::new(
                "tag-change",
                label::POWER,
                r"TAG_CHANGE Entity=(?P<entity>.+?) tag=(?P<tag>\w+) value=(?P<value>\S*)",
                tags::tag_change,
            )?)
            .push(BlockParser::new(
                "entity-definition",
                label::POWER,
                r"(?:FULL_ENTITY - Creating ID=(?P<id>\d+)|(?:SHOW|CHANGE)_ENTITY - Updating Entity=(?P<entity>.+?)) CardID=(?P<cardId>\S*)",
                r"tag=(?P<tag>\w+) value=(?P<value>\S*)",
                4,
                blocks::open_definition,
                blocks::definition_tag,
            )?)
            .push(BlockParser::new(
                "entity-choices",
                label::CHOICES,
                r"id=\d+ Player=(?P<playerName>.+?) TaskList=\S* ChoiceType=(?P<choiceType>\w+)",
                r"(?:Source=(?P<source>.+)|Entities\[\d+\]=(?P<option>.+))",
                2,
                blocks::open_choices,
                blocks::choice_line,
            )?)
            .push(BlockParser::new(
                "entities-chosen",
                label::CHOSEN,
                r"id=\d+ Player=(?P<playerName>.+?) EntitiesCount=\d+",
                r"Entities\[\d+\]=(?P<entity>.+)",
                2,
                blocks::open_chosen,
                blocks::chosen_line,
            )?);

        tracing::debug!(recognizers = pipeline.recognizers.len(), "Pipeline ready");
        Ok(pipeline)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.recognizers.iter().map(|r| r.name())
    }

    pub fn cards(&self) -> &Arc<dyn CardDatabase> {
        &self.cards
    }

    /// Offer one line to every recognizer. Returns true if any of them changed state.
    pub fn process_line_at(&mut self, line: &str, state: &mut GameState, now: NaiveDateTime) -> bool {
        let Self { recognizers, cards } = self;
        let ctx = LineContext {
            now,
            cards: &**cards,
        };

        let mut changed = false;
        for recognizer in recognizers.iter_mut() {
            changed |= recognizer.process(line, state, &ctx);
        }
        changed
    }

    /// Apply a batch in order, stamping each line with the wall clock.
    pub fn process_batch(&mut self, lines: &[String], state: &mut GameState) -> BatchOutcome {
        let start = state.start_time;
        let sequence = state.turn_sequence;

        let mut changed = false;
        for line in lines {
            changed |= self.process_line_at(line, state, Local::now().naive_local());
        }

        // A new match resets the sequence, so compare against the match too
        let turn_changed = if state.start_time == start {
            state.turn_sequence != sequence
        } else {
            state.turn_sequence > 0
        };
        tracing::trace!(lines = lines.len(), changed, turn_changed, "Batch applied");

        BatchOutcome {
            changed,
            turn_changed,
        }
    }
}

//! Canonical model of one match.
//!
//! ```text
//! GameState
//! ├── players[2] ── cards, secrets, quests, discovery, turn history
//! ├── match_log  ── attack / play / trigger entries with entity snapshots
//! └── entities   ── last-known facts for resolving forward references
//! ```

mod entity;
mod game;
mod match_log;
mod player;

pub use entity::{
    CardEntity, DisplayTag, Entity, EntityId, GameEntity, PlayerEntity, Side, TagMap,
    derive_display_tags,
};
pub use game::{GameState, MAX_PLAYERS, TERMINAL_GAME_OVER_COUNT};
pub use match_log::{ActionKind, EntitySnapshot, MatchLogEntry};
pub use player::{
    Card, CardState, Discovery, Mana, PlayStatus, Player, Quest, Secret, TurnRecord,
};

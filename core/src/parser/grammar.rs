//! Vocabulary of the client log.
//!
//! Every recognized line reads `<label> -<indentation><content>`. Labels are
//! regex fragments (already escaped) naming the subsystem that wrote the line.

pub mod label {
    pub const POWER: &str = r"\[Power\] GameState\.DebugPrintPower\(\)";
    pub const GAME: &str = r"\[Power\] GameState\.DebugPrintGame\(\)";
    pub const CHOICES: &str = r"\[Power\] GameState\.DebugPrintEntityChoices\(\)";
    pub const CHOSEN: &str = r"\[Power\] GameState\.DebugPrintEntitiesChosen\(\)";
    pub const ZONE: &str = r"\[Zone\] ZoneChangeList\.ProcessChanges\(\)";
    pub const LOADING_SCREEN: &str = r"\[LoadingScreen\] LoadingScreen\.OnSceneLoaded\(\)";
}

pub mod tag {
    pub const CURRENT_PLAYER: &str = "CURRENT_PLAYER";
    pub const PLAYSTATE: &str = "PLAYSTATE";
    pub const RESOURCES: &str = "RESOURCES";
    pub const RESOURCES_USED: &str = "RESOURCES_USED";
    pub const TEMP_RESOURCES: &str = "TEMP_RESOURCES";
    pub const OVERLOAD_OWED: &str = "OVERLOAD_OWED";
    pub const OVERLOAD_LOCKED: &str = "OVERLOAD_LOCKED";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const QUEST_PROGRESS: &str = "QUEST_PROGRESS";
    pub const MULLIGAN_STATE: &str = "MULLIGAN_STATE";
    pub const STEP: &str = "STEP";
    pub const NEXT_STEP: &str = "NEXT_STEP";
    pub const DAMAGE: &str = "DAMAGE";
    pub const ZONE: &str = "ZONE";
}

pub mod zone {
    pub const DECK: &str = "DECK";
    pub const HAND: &str = "HAND";
    pub const SECRET: &str = "SECRET";
    pub const GRAVEYARD: &str = "GRAVEYARD";
}

pub mod step {
    pub const BEGIN_MULLIGAN: &str = "BEGIN_MULLIGAN";
    pub const MAIN_READY: &str = "MAIN_READY";
    pub const MULLIGAN_INPUT: &str = "INPUT";
    pub const MULLIGAN_DONE: &str = "DONE";
}

/// Marks the first line of every match.
pub const CREATE_GAME: &str = "CREATE_GAME";

/// Cards in a constructed deck; input to the mulligan replacement count.
pub const DECK_SIZE: i32 = 30;

/// Choice type the client uses for discover-style picks.
pub const CHOICE_GENERAL: &str = "GENERAL";

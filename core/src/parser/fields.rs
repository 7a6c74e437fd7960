use std::str::FromStr;

use chrono::NaiveDateTime;
use regex::Captures;

use crate::game_data::CardDatabase;

/// Capture group every composed pattern uses for the indentation run.
pub const INDENT_GROUP: &str = "indent";

/// Named captures of one matched line, keyed by group name.
pub struct Fields<'t> {
    caps: Captures<'t>,
}

impl<'t> Fields<'t> {
    pub(crate) fn new(caps: Captures<'t>) -> Self {
        Self { caps }
    }

    /// Capture text, `None` when the group did not participate.
    pub fn get(&self, name: &str) -> Option<&'t str> {
        self.caps.name(name).map(|m| m.as_str())
    }

    /// Capture text, empty when the group did not participate.
    pub fn str(&self, name: &str) -> &'t str {
        self.get(name).unwrap_or("")
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|s| s.trim().parse().ok())
    }

    /// Width of the whitespace run between the label and the content.
    pub fn indent(&self) -> usize {
        self.get(INDENT_GROUP).map_or(0, str::len)
    }
}

/// Everything a handler may consult besides the game state.
pub struct LineContext<'a> {
    pub now: NaiveDateTime,
    pub cards: &'a dyn CardDatabase,
}

use regex::Regex;

use super::fields::{Fields, INDENT_GROUP, LineContext};
use crate::state::GameState;

/// Applies a matched line to the game state; returns whether observable state changed.
pub type Handler = fn(&Fields<'_>, &mut GameState, &LineContext<'_>) -> bool;

/// One entry of the ordered recognizer list.
///
/// Implementations never fail: a line they do not understand is simply not theirs.
pub trait Recognizer: Send {
    fn name(&self) -> &'static str;

    fn process(&mut self, line: &str, state: &mut GameState, ctx: &LineContext<'_>) -> bool;
}

/// `<label> -<indentation><content>` with the indentation captured as `indent`.
pub fn compose(label: &str, content: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"{label} -(?P<{INDENT_GROUP}>\s+)(?:{content})"))
}

/// Stateless single-line recognizer: a label, a content pattern, and a handler.
pub struct PatternParser {
    name: &'static str,
    regex: Regex,
    handler: Handler,
}

impl PatternParser {
    pub fn new(
        name: &'static str,
        label: &str,
        content: &str,
        handler: Handler,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            regex: compose(label, content)?,
            handler,
        })
    }
}

impl Recognizer for PatternParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&mut self, line: &str, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
        let Some(caps) = self.regex.captures(line) else {
            return false;
        };
        let _span = tracing::debug_span!("recognizer", name = self.name).entered();
        (self.handler)(&Fields::new(caps), state, ctx)
    }
}

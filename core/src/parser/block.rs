//! Indentation-scoped multi-line recognizer.
//!
//! ```text
//! [Power] ... -    BLOCK_START BlockType=ATTACK ...     <- start, indent 4
//! [Power] ... -        TAG_CHANGE ... tag=DAMAGE ...    <- child, indent 4 + offset
//! [Zone]  ... -  id=7 local=False ...                   <- other label, ignored
//! [Power] ... -    BLOCK_END                            <- same label, indent 4: closes
//! ```
//!
//! The log has no reliable end markers, so a same-label line at any indentation
//! other than the child column ends the block.

use regex::Regex;

use super::fields::{Fields, INDENT_GROUP, LineContext};
use super::pattern::{Recognizer, compose};
use crate::state::GameState;

/// Opens a block from its start line. `None` declines; `Some((state, changed))` opens it.
pub type BlockInit<S> = fn(&Fields<'_>, &mut GameState, &LineContext<'_>) -> Option<(S, bool)>;

/// Applies one child line to the open block.
pub type BlockLine<S> = fn(&Fields<'_>, &mut S, &mut GameState, &LineContext<'_>) -> bool;

struct OpenBlock<S> {
    indent: usize,
    state: S,
}

/// Single slot holding the currently open block of one kind.
pub struct BlockSlot<S> {
    open: Option<OpenBlock<S>>,
}

impl<S> BlockSlot<S> {
    fn open(&mut self, indent: usize, state: S) {
        self.open = Some(OpenBlock { indent, state });
    }

    fn close(&mut self) -> Option<S> {
        self.open.take().map(|b| b.state)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Indentation of the start line of the open block.
    pub fn indent(&self) -> Option<usize> {
        self.open.as_ref().map(|b| b.indent)
    }
}

impl<S> Default for BlockSlot<S> {
    fn default() -> Self {
        Self { open: None }
    }
}

pub struct BlockParser<S> {
    name: &'static str,
    label: Regex,
    start: Regex,
    line: Regex,
    child_offset: usize,
    initialize: BlockInit<S>,
    handle_line: BlockLine<S>,
    slot: BlockSlot<S>,
}

impl<S> BlockParser<S> {
    pub fn new(
        name: &'static str,
        label: &str,
        start: &str,
        line: &str,
        child_offset: usize,
        initialize: BlockInit<S>,
        handle_line: BlockLine<S>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            label: compose(label, "")?,
            start: compose(label, start)?,
            line: compose(label, line)?,
            child_offset,
            initialize,
            handle_line,
            slot: BlockSlot::default(),
        })
    }

    pub fn slot(&self) -> &BlockSlot<S> {
        &self.slot
    }
}

impl<S: Send> Recognizer for BlockParser<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&mut self, line: &str, state: &mut GameState, ctx: &LineContext<'_>) -> bool {
        if let Some(caps) = self.start.captures(line) {
            let fields = Fields::new(caps);
            let _span = tracing::debug_span!("recognizer", name = self.name).entered();

            // One slot per kind: a new start always discards the previous block
            self.slot.close();
            return match (self.initialize)(&fields, state, ctx) {
                Some((block, changed)) => {
                    self.slot.open(fields.indent(), block);
                    changed
                }
                None => false,
            };
        }

        let Some(open) = self.slot.open.as_mut() else {
            return false;
        };
        let Some(label_caps) = self.label.captures(line) else {
            return false;
        };
        let indent = label_caps.name(INDENT_GROUP).map_or(0, |m| m.as_str().len());

        if indent != open.indent + self.child_offset {
            tracing::trace!(block = self.name, indent, "Block closed by indentation");
            self.slot.close();
            return false;
        }

        let Some(caps) = self.line.captures(line) else {
            return false;
        };
        let _span = tracing::debug_span!("recognizer", name = self.name).entered();
        (self.handle_line)(&Fields::new(caps), &mut open.state, state, ctx)
    }
}

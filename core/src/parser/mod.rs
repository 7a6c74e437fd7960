//! Line recognizers that turn client log lines into [`GameState`] mutations.
//!
//! ```text
//! line ─▶ Pipeline ─▶ PatternParser (stateless, one line)
//!                  └▶ BlockParser<S> (indentation-scoped, owns its slot)
//!                        └▶ handlers ─▶ GameState / resolver
//! ```
//!
//! [`GameState`]: crate::state::GameState

mod block;
mod entity_ref;
mod fields;
pub mod grammar;
mod handlers;
mod pattern;
mod pipeline;

#[cfg(test)]
mod pipeline_tests;

pub use block::{BlockInit, BlockLine, BlockParser, BlockSlot};
pub use entity_ref::{CardRef, EntityRef};
pub use fields::{Fields, INDENT_GROUP, LineContext};
pub use pattern::{Handler, PatternParser, Recognizer, compose};
pub use pipeline::{BatchOutcome, Pipeline};

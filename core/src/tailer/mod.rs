//! Incremental reading of the client log.
//!
//! [`LogTailer`] turns file growth into complete lines, [`LogWatcher`] drives it
//! from filesystem events, and [`OutputLog`] mirrors consumed lines per match.

mod output;
mod reader;
mod watcher;

pub use output::{LineSink, OutputLog};
pub use reader::{LogTailer, chunk_lines};
pub use watcher::{LogWatcher, WatchError, WatcherHandle};

//! Configuration types shared between the deckwatch engine and its consumers.

mod config;

pub use config::{DEFAULT_DEBOUNCE_MS, NotifyMode, WatcherConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Trailing-edge debounce applied to file growth events.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// When the watcher should publish `StateChanged` notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// After every chunk that mutated the game state.
    #[default]
    EveryMutation,
    /// Only when the active turn changed during the chunk.
    TurnBoundaries,
}

/// Options supplied once when the log watcher is constructed.
///
/// None of these are hot-reloadable: a running watcher keeps the values it
/// was started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Absolute path of the client log to tail.
    pub log_path: PathBuf,
    /// Directory receiving the per-match copy of consumed lines. Disabled when unset.
    pub output_directory: Option<PathBuf>,
    /// Lines per processing chunk. Unset processes each batch at once.
    pub chunk_size: Option<usize>,
    pub notify_mode: NotifyMode,
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::new(),
            output_directory: None,
            chunk_size: None,
            notify_mode: NotifyMode::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl WatcherConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Self::default()
        }
    }

    /// Chunk size with zero treated as "whole batch".
    pub fn effective_chunk_size(&self) -> Option<usize> {
        self.chunk_size.filter(|&n| n > 0)
    }
}

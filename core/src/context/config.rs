use std::path::Path;

use deckwatch_types::WatcherConfig;

/// Name the configuration is stored under in the platform config directory.
pub const APP_NAME: &str = "deckwatch";

/// Persistence for [`WatcherConfig`] via `confy`.
pub trait ConfigExt: Sized {
    /// Stored configuration, or defaults when none exists or it cannot be read.
    fn load() -> Self;

    fn save(&self) -> Result<(), confy::ConfyError>;

    /// Like [`load`](Self::load) for an explicit file.
    fn load_from(path: &Path) -> Self;

    fn save_to(&self, path: &Path) -> Result<(), confy::ConfyError>;
}

impl ConfigExt for WatcherConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                WatcherConfig::default()
            }
        }
    }

    fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, None, self)
    }

    fn load_from(path: &Path) -> Self {
        match confy::load_path(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                WatcherConfig::default()
            }
        }
    }

    fn save_to(&self, path: &Path) -> Result<(), confy::ConfyError> {
        confy::store_path(path, self)
    }
}

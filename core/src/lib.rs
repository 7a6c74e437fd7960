//! Streaming reconstruction of a card-game match from the client's debug log.

pub mod context;
pub mod events;
pub mod game_data;
pub mod parser;
pub mod resolver;
pub mod state;
pub mod tailer;

pub use deckwatch_types::{DEFAULT_DEBOUNCE_MS, NotifyMode, WatcherConfig};
pub use events::{ChangeNotifier, StateEvent};
pub use game_data::{CardDatabase, CardTable};
pub use parser::Pipeline;
pub use state::GameState;
pub use tailer::{LogWatcher, WatchError, WatcherHandle};

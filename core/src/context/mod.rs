mod config;
mod parsing_session;

pub use config::{APP_NAME, ConfigExt};
pub use parsing_session::ParsingSession;

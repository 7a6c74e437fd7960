use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use deckwatch_types::WatcherConfig;
use tokio::sync::RwLock;

use crate::events::{ChangeNotifier, StateEvent};
use crate::game_data::CardDatabase;
use crate::parser::Pipeline;
use crate::parser::grammar::CREATE_GAME;
use crate::state::GameState;
use crate::tailer::{LineSink, LogTailer, chunk_lines};

/// One tailed log: reader, recognizers, shared state, and notification.
///
/// Owned by a single task; every read/parse cycle runs to completion before
/// the next one starts.
pub struct ParsingSession {
    tailer: LogTailer,
    pipeline: Pipeline,
    state: Arc<RwLock<GameState>>,
    notifier: ChangeNotifier,
    output: Option<Box<dyn LineSink>>,
    chunk_size: Option<usize>,
}

impl ParsingSession {
    pub fn new(config: &WatcherConfig, cards: Arc<dyn CardDatabase>) -> Result<Self, regex::Error> {
        Ok(Self {
            tailer: LogTailer::new(&config.log_path),
            pipeline: Pipeline::standard(cards)?,
            state: Arc::new(RwLock::new(GameState::new())),
            notifier: ChangeNotifier::new(config.notify_mode),
            output: None,
            chunk_size: config.effective_chunk_size(),
        })
    }

    /// Copy every consumed line into this sink.
    pub fn set_output(&mut self, sink: Box<dyn LineSink>) {
        self.output = Some(sink);
    }

    pub fn state(&self) -> Arc<RwLock<GameState>> {
        Arc::clone(&self.state)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn log_path(&self) -> &Path {
        self.tailer.path()
    }

    pub fn offset(&self) -> u64 {
        self.tailer.offset()
    }

    /// Forget the read position; the next cycle starts from the beginning of the file.
    pub fn reset(&mut self) {
        self.tailer.reset();
    }

    /// Read whatever the log grew by and apply it. Returns the published events.
    ///
    /// A missing file is not an error (the client may not have created it
    /// yet); read failures are logged and retried on the next cycle.
    pub async fn consume(&mut self) -> Vec<StateEvent> {
        let size = match tokio::fs::metadata(self.tailer.path()).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.log_path().display(), "Log file not there yet");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.log_path().display(), error = %e, "Failed to stat log");
                return Vec::new();
            }
        };

        let lines = match self.tailer.read_growth(size).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(path = %self.log_path().display(), error = %e, "Failed to read log");
                return Vec::new();
            }
        };
        if lines.is_empty() {
            return Vec::new();
        }
        tracing::debug!(lines = lines.len(), offset = self.tailer.offset(), "Read log growth");

        self.apply(&lines).await
    }

    /// Run lines through the pipeline chunk by chunk, publishing after each chunk.
    pub async fn apply(&mut self, lines: &[String]) -> Vec<StateEvent> {
        let state = Arc::clone(&self.state);
        let mut events = Vec::new();

        for chunk in chunk_lines(lines, self.chunk_size) {
            let outcome = {
                let mut state = state.write().await;
                self.write_output(chunk);
                self.pipeline.process_batch(chunk, &mut state)
            };
            events.extend(self.notifier.publish(outcome));
        }
        events
    }

    fn write_output(&mut self, lines: &[String]) {
        let Some(sink) = self.output.as_mut() else {
            return;
        };

        let result = lines
            .iter()
            .try_for_each(|line| {
                if line.contains(CREATE_GAME) {
                    sink.start_match(Local::now().naive_local())?;
                }
                sink.write_line(line)
            })
            .and_then(|_| sink.flush());

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write output log");
        }
    }
}

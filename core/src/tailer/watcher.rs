use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use deckwatch_types::WatcherConfig;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;

use super::output::{LineSink, OutputLog};
use crate::context::ParsingSession;
use crate::events::{ChangeNotifier, StateEvent};
use crate::game_data::CardDatabase;
use crate::state::GameState;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("invalid recognizer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Builder for a running log watch.
pub struct LogWatcher {
    config: WatcherConfig,
    cards: Arc<dyn CardDatabase>,
    output: Option<Box<dyn LineSink>>,
}

impl LogWatcher {
    pub fn new(config: WatcherConfig, cards: Arc<dyn CardDatabase>) -> Self {
        Self {
            config,
            cards,
            output: None,
        }
    }

    /// Replace the default output log (derived from `output_directory`).
    pub fn with_output(mut self, sink: Box<dyn LineSink>) -> Self {
        self.output = Some(sink);
        self
    }

    /// Validate the configured paths, start watching, and read what the file already holds.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<WatcherHandle, WatchError> {
        let log_path = self.config.log_path.clone();
        let directory = watch_directory(&log_path);
        require_directory(&directory)?;

        let output = match (self.output, &self.config.output_directory) {
            (Some(sink), _) => Some(sink),
            (None, Some(dir)) => {
                require_directory(dir)?;
                Some(Box::new(OutputLog::new(dir)) as Box<dyn LineSink>)
            }
            (None, None) => None,
        };

        let mut session = ParsingSession::new(&self.config, self.cards)?;
        if let Some(sink) = output {
            session.set_output(sink);
        }
        let state = session.state();
        let notifier = session.notifier().clone();
        let session = Arc::new(Mutex::new(session));

        let (tx, rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = notify::recommended_watcher(move |result| {
            if tx.send(result).is_err() {
                tracing::debug!("Log watcher receiver dropped");
            }
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        let debounce = Duration::from_millis(self.config.debounce_ms);
        let task = tokio::spawn(watch_loop(
            Arc::clone(&session),
            log_path.file_name().map(OsString::from),
            rx,
            debounce,
        ));

        tracing::info!(
            path = %log_path.display(),
            debounce_ms = self.config.debounce_ms,
            "Watching log"
        );

        Ok(WatcherHandle {
            watcher,
            task,
            session,
            state,
            notifier,
            log_path,
        })
    }
}

/// Running watch. Dropping it without [`stop`](Self::stop) leaves the task running
/// until the runtime shuts down.
pub struct WatcherHandle {
    watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    session: Arc<Mutex<ParsingSession>>,
    state: Arc<RwLock<GameState>>,
    notifier: ChangeNotifier,
    log_path: PathBuf,
}

impl WatcherHandle {
    pub fn game_state(&self) -> Arc<RwLock<GameState>> {
        Arc::clone(&self.state)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.notifier.subscribe()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Bytes of the log consumed so far.
    pub async fn offset(&self) -> u64 {
        self.session.lock().await.offset()
    }

    /// Close the file watch and cancel the task; no pending debounce fires afterwards.
    pub async fn stop(self) {
        let Self {
            watcher,
            task,
            session,
            log_path,
            ..
        } = self;

        drop(watcher);
        task.abort();
        if let Err(e) = task.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "Log watcher task failed");
        }

        session.lock().await.reset();
        tracing::info!(path = %log_path.display(), "Stopped watching log");
    }
}

/// Parent directory of the log; the working directory for a bare file name.
fn watch_directory(log_path: &Path) -> PathBuf {
    match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn require_directory(path: &Path) -> Result<(), WatchError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WatchError::MissingDirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(WatchError::MissingDirectory {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(WatchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn is_relevant(event: &Event, file_name: Option<&OsString>) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let Some(file_name) = file_name else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

async fn watch_loop(
    session: Arc<Mutex<ParsingSession>>,
    file_name: Option<OsString>,
    mut rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    debounce: Duration,
) {
    session.lock().await.consume().await;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(event) if is_relevant(&event, file_name.as_ref()) => {}
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "File watcher error");
                continue;
            }
        }

        // Trailing edge: wait for the burst to go quiet before reading
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        session.lock().await.consume().await;
    }

    tracing::debug!("Log watcher channel closed");
}

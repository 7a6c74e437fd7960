use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Destination for the lines consumed from the client log.
pub trait LineSink: Send {
    /// A new match begins with the next line.
    fn start_match(&mut self, started: NaiveDateTime) -> io::Result<()>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Per-match copy of the log: `<directory>/match_<YYYYmmdd_HHMMSS>.log`.
///
/// Lines seen before the first match start are dropped.
pub struct OutputLog {
    directory: PathBuf,
    current: Option<(PathBuf, BufWriter<File>)>,
}

impl OutputLog {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            current: None,
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|(path, _)| path.as_path())
    }
}

impl LineSink for OutputLog {
    fn start_match(&mut self, started: NaiveDateTime) -> io::Result<()> {
        self.flush()?;

        let path = self
            .directory
            .join(format!("match_{}.log", started.format("%Y%m%d_%H%M%S")));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), "Output log rotated");
        self.current = Some((path, BufWriter::new(file)));
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match &mut self.current {
            Some((_, writer)) => writeln!(writer, "{line}"),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.current {
            Some((_, writer)) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for OutputLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "Failed to flush output log");
        }
    }
}

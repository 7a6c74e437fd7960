use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use encoding_rs::UTF_8;
use memchr::memchr_iter;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Reads only what a log file grew by since the previous read.
///
/// Bytes after the last newline are held back until their line is complete,
/// so a line is delivered exactly once even when the writer flushes mid-line.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    last_read_offset: u64,
    fragment: Vec<u8>,
}

impl LogTailer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_read_offset: 0,
            fragment: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.last_read_offset
    }

    pub fn reset(&mut self) {
        self.last_read_offset = 0;
        self.fragment.clear();
    }

    /// Current file size, then [`read_growth`](Self::read_growth).
    pub async fn read_new_lines(&mut self) -> io::Result<Vec<String>> {
        let size = fs::metadata(&self.path).await?.len();
        self.read_growth(size).await
    }

    /// Read `[last_read_offset, new_size)`, or `[0, new_size)` when the file shrank.
    pub async fn read_growth(&mut self, new_size: u64) -> io::Result<Vec<String>> {
        let start = if new_size < self.last_read_offset {
            tracing::info!(
                path = %self.path.display(),
                previous = self.last_read_offset,
                new_size,
                "Log file shrank, reading from start"
            );
            self.fragment.clear();
            0
        } else {
            self.last_read_offset
        };

        if new_size == start {
            self.last_read_offset = new_size;
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(start)).await?;
        let mut bytes = Vec::with_capacity((new_size - start) as usize);
        file.take(new_size - start).read_to_end(&mut bytes).await?;

        // The file may have shrunk again after the size was sampled
        self.last_read_offset = start + bytes.len() as u64;
        Ok(self.split_lines(bytes))
    }

    fn split_lines(&mut self, chunk: Vec<u8>) -> Vec<String> {
        let bytes = if self.fragment.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.fragment);
            joined.extend_from_slice(&chunk);
            joined
        };

        let mut lines = Vec::new();
        let mut start = 0;
        for end in memchr_iter(b'\n', &bytes) {
            if end > start {
                let line = decode_line(&bytes[start..end]);
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            start = end + 1;
        }
        self.fragment = bytes[start..].to_vec();
        lines
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let (text, _, _) = UTF_8.decode(bytes);
    text.into_owned()
}

/// Split a batch into processing chunks. `None` (or zero) keeps the batch whole.
pub fn chunk_lines(lines: &[String], chunk_size: Option<usize>) -> std::slice::Chunks<'_, String> {
    let size = chunk_size
        .filter(|&n| n > 0)
        .unwrap_or(lines.len())
        .max(1);
    lines.chunks(size)
}

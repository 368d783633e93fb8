//! JSON-lines file sink

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::{LogEntry, PredictionLog};
use super::SinkError;

/// Appends one JSON record per line to a single log file.
///
/// The handle is opened on first use and kept for the life of the sink. All
/// appends go through one lock so concurrent requests never interleave lines.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append record to the log
    pub async fn append(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file_guard = self.file.lock().await;

        if file_guard.is_none() {
            *file_guard = Some(self.open().await?);
        }

        if let Some(file) = file_guard.as_mut() {
            let written = async {
                file.write_all(line.as_bytes()).await?;
                file.flush().await
            }
            .await;

            if let Err(e) = written {
                // Reopen on the next append rather than reuse a broken handle
                *file_guard = None;
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Newest-first page of logged entries. Malformed lines are skipped.
    pub async fn recent(&self, limit: i64, offset: i64) -> Result<Vec<PredictionLog>, SinkError> {
        // Lock only for the read itself; parsing must not stall appends
        let read = {
            let _guard = self.file.lock().await;
            fs::read_to_string(&self.path).await
        };

        let content = match read {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries: Vec<LogEntry> = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str::<LogEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping malformed line {} in {}: {}", idx + 1, self.path.display(), e);
                    None
                }
            })
            .collect();

        // Reverse first so equal timestamps keep newest-appended first
        entries.reverse();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(entries
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(PredictionLog::from)
            .collect())
    }

    /// Flush and release the file handle
    pub async fn close(&self) {
        let mut file_guard = self.file.lock().await;
        if let Some(mut file) = file_guard.take() {
            if let Err(e) = file.flush().await {
                tracing::warn!("Failed to flush {}: {}", self.path.display(), e);
            }
        }
    }

    async fn open(&self) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
    }
}

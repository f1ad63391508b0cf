//! Append-only audit log with file-based persistence.
//!
//! Records are stored as newline-delimited JSON (JSONL). Every append opens
//! the file, writes one complete line and closes the handle again, so a
//! record is on disk before the next one is attempted and nothing is held
//! in memory between notifications. Under high event rates this costs one
//! open/close per record; buffering would change what survives a crash, so
//! it is not done here.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::RecorderSettings;
use crate::domain::EventRecord;

use super::error::AuditError;

/// File-backed append-only writer for audit records
#[derive(Debug, Clone)]
pub struct LogSink {
    /// Directory holding the log file
    log_dir: PathBuf,

    /// Path to the JSONL log file
    log_path: PathBuf,

    /// Call `sync_data` before closing each append
    sync_writes: bool,
}

impl LogSink {
    /// Sink writing `file_name` inside `log_dir`. Touches nothing on disk.
    pub fn new(log_dir: impl Into<PathBuf>, file_name: &str) -> Self {
        let log_dir = log_dir.into();
        let log_path = log_dir.join(file_name);

        Self {
            log_dir,
            log_path,
            sync_writes: false,
        }
    }

    /// Sink for the configured log location
    pub fn from_settings(settings: &RecorderSettings) -> Self {
        Self::new(&settings.log_dir, &settings.log_file).with_sync_writes(settings.sync_writes)
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Get the log directory
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Ensure the log directory exists. Idempotent.
    pub fn provision(&self) -> Result<(), AuditError> {
        match fs::create_dir_all(&self.log_dir) {
            Ok(()) => Ok(()),
            // Lost a race with another creator
            Err(_) if self.log_dir.is_dir() => Ok(()),
            Err(source) => Err(AuditError::StorageUnavailable {
                path: self.log_dir.clone(),
                source,
            }),
        }
    }

    /// Append one record as a single JSON line
    pub fn append(&self, record: &EventRecord) -> Result<(), AuditError> {
        let write_failed = |source: io::Error| AuditError::WriteFailed {
            path: self.log_path.clone(),
            source,
        };

        let json = serde_json::to_string(record).map_err(|e| write_failed(e.into()))?;
        let line = format!("{}\n", json);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(write_failed)?;

        // One write call per line keeps small appends atomic on local filesystems
        file.write_all(line.as_bytes()).map_err(write_failed)?;
        file.flush().map_err(write_failed)?;

        if self.sync_writes {
            file.sync_data().map_err(write_failed)?;
        }

        debug!(
            event_type = ?record.event_type,
            bytes = line.len(),
            path = %self.log_path.display(),
            "Appended audit record"
        );

        Ok(())
    }
}

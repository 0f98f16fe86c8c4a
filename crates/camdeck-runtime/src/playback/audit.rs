//! Playback audit trail.
//!
//! Every granted stream or download produces one [`PlaybackAuditRecord`].
//! The record must be acknowledged by the [`AuditSink`] before a URL is
//! released; a sink failure aborts the request.
//!
//! | Sink | Durability |
//! |------|------------|
//! | [`MemoryAuditLog`] | Process lifetime |
//! | [`JsonlAuditLog`] | One JSON object per line, synced to disk per append |
//!
//! A JSONL line is either complete or absent: a failed write is truncated
//! away, and a torn tail left by a crash is dropped when the log is opened.
//! Neither was ever acknowledged to a caller.

use super::{PlaybackIntent, PlaybackSource, ReasonCode};
use camdeck_auth::RoleSet;
use camdeck_types::{ActorId, AuditRecordId, ErrorClass, ErrorCode, MediaId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Immutable record of one granted playback or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackAuditRecord {
    pub id: AuditRecordId,
    pub actor: ActorId,
    pub roles: RoleSet,
    pub media: MediaId,
    pub source: PlaybackSource,
    pub intent: PlaybackIntent,
    pub reason: ReasonCode,
    pub at: DateTime<Utc>,
}

/// Audit sink failure.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audit record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("audit log '{path}' line {line} does not decode: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("audit sink rejected record: {0}")]
    Rejected(String),
}

impl AuditError {
    /// Creates an io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for AuditError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "AUDIT_IO",
            Self::Encode(_) => "AUDIT_ENCODE",
            Self::Corrupt { .. } => "AUDIT_CORRUPT",
            Self::Rejected(_) => "AUDIT_REJECTED",
        }
    }

    fn class(&self) -> ErrorClass {
        ErrorClass::Unavailable
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Encode(_) | Self::Corrupt { .. })
    }
}

/// Append-only destination for audit records.
///
/// `append` returns only after the record is durable for the sink's
/// guarantees. Records are never updated or deleted.
pub trait AuditSink: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the record was not stored.
    fn append(&self, record: &PlaybackAuditRecord) -> Result<(), AuditError>;
}

/// In-process audit log.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<PlaybackAuditRecord>>,
}

impl MemoryAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<PlaybackAuditRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &PlaybackAuditRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// JSON-lines audit log.
///
/// Each append writes one line and calls `sync_data` before returning.
/// Appends are serialized by an internal lock.
#[derive(Debug)]
pub struct JsonlAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditLog {
    /// Opens (or creates) the log at `path`, creating parent directories.
    ///
    /// An unterminated last line is truncated before the first append.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| AuditError::io(parent, e))?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| AuditError::io(&path, e))?;
        let dropped = trim_torn_tail(&mut file).map_err(|e| AuditError::io(&path, e))?;
        if dropped > 0 {
            warn!(path = %path.display(), bytes = dropped, "dropped unterminated audit line");
        }
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in the log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the file cannot be read or a line does not
    /// decode.
    pub fn read_all(&self) -> Result<Vec<PlaybackAuditRecord>, AuditError> {
        read_jsonl(&self.path)
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, record: &PlaybackAuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock();
        let len = file
            .metadata()
            .map_err(|e| AuditError::io(&self.path, e))?
            .len();
        if let Err(e) = file.write_all(line.as_bytes()) {
            if let Err(trunc) = file.set_len(len) {
                warn!(path = %self.path.display(), error = %trunc, "could not truncate partial audit line");
            }
            return Err(AuditError::io(&self.path, e));
        }
        file.sync_data().map_err(|e| AuditError::io(&self.path, e))
    }
}

/// Truncates `file` after its last newline. Returns the bytes removed.
fn trim_torn_tail(file: &mut File) -> std::io::Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(0);
    }

    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1) as u64;
    file.set_len(keep)?;
    Ok(len - keep)
}

/// Reads a JSON-lines audit file.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns [`AuditError::Corrupt`] naming the first line that does not
/// decode, or [`AuditError::Io`] if the file cannot be read.
pub fn read_jsonl(path: &Path) -> Result<Vec<PlaybackAuditRecord>, AuditError> {
    let file = File::open(path).map_err(|e| AuditError::io(path, e))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AuditError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| AuditError::Corrupt {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

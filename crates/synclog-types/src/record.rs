use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Placeholder stored in text fields when the line didn't carry a value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Canonical on-disk timestamp layout. Lexical order is chronological.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Log dialect, i.e. which of the two report formats a file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Success,
    Failed,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Success, Dialect::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Success => "success",
            Dialect::Failed => "failed",
        }
    }

    /// Outcome shared by every record of a file in this dialect.
    pub fn status(&self) -> TransferStatus {
        match self {
            Dialect::Success => TransferStatus::Success,
            Dialect::Failed => TransferStatus::Failed,
        }
    }

    /// Classify a filename by prefix, e.g. `sync_succeed_*` / `sync_failed_*`.
    pub fn classify(filename: &str, success_prefix: &str, failed_prefix: &str) -> Option<Self> {
        if filename.starts_with(success_prefix) {
            Some(Dialect::Success)
        } else if filename.starts_with(failed_prefix) {
            Some(Dialect::Failed)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(Dialect::Success),
            "failed" => Ok(Dialect::Failed),
            other => Err(Error::invalid("dialect", other)),
        }
    }
}

/// Outcome column of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Success => "success",
            TransferStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(TransferStatus::Success),
            "failed" => Ok(TransferStatus::Failed),
            other => Err(Error::invalid("status", other)),
        }
    }
}

/// Outcome-specific payload. A success carries its message, a failure its
/// error code and message, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Succeeded {
        message: String,
    },
    Failed {
        error_code: String,
        error_message: String,
    },
}

impl TransferOutcome {
    pub fn status(&self) -> TransferStatus {
        match self {
            TransferOutcome::Succeeded { .. } => TransferStatus::Success,
            TransferOutcome::Failed { .. } => TransferStatus::Failed,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TransferOutcome::Succeeded { message } => Some(message),
            TransferOutcome::Failed { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            TransferOutcome::Succeeded { .. } => None,
            TransferOutcome::Failed { error_code, .. } => Some(error_code),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            TransferOutcome::Succeeded { .. } => None,
            TransferOutcome::Failed { error_message, .. } => Some(error_message),
        }
    }
}

/// One accepted line of a transfer report, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Event time taken from the line header.
    pub timestamp: DateTime<Utc>,
    /// Size as written in the line, or `n/a`.
    pub file_size: String,
    /// Byte count derived from `file_size`.
    pub file_size_bytes: u64,
    pub src_path: String,
    pub dst_path: String,
    /// Transfer duration in milliseconds.
    pub cost_ms: Option<i64>,
    /// Protocol status code, `n/a` when absent.
    pub status_code: String,
    pub request_id: String,
    /// Content hash, `n/a` when absent.
    pub md5: String,
    pub outcome: TransferOutcome,
}

impl TransferRecord {
    pub fn status(&self) -> TransferStatus {
        self.outcome.status()
    }
}

/// Imported source file marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFile {
    pub id: i64,
    /// Bare filename, unique across the store.
    pub filename: String,
    pub file_type: Dialect,
    /// Import time (ISO 8601).
    pub created_at: String,
}

/// Imported files grouped by dialect, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileListing {
    pub success_files: Vec<String>,
    pub failed_files: Vec<String>,
}

/// Persisted record as returned by the read path, flattened for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    /// Filename of the owning log file.
    pub log_file: String,
    /// Event time (ISO 8601).
    pub timestamp: String,
    pub status: TransferStatus,
    pub file_size: String,
    pub file_size_bytes: i64,
    pub src_path: String,
    pub dst_path: String,
    pub cost: Option<i64>,
    pub status_code: String,
    pub message: Option<String>,
    pub request_id: String,
    pub md5: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Aggregates over all persisted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub total_logs: i64,
    pub success_logs: i64,
    pub failed_logs: i64,
    /// Sum of byte counts over successful transfers.
    pub total_size: i64,
}

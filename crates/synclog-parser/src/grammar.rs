use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use synclog_types::{
    Dialect, NOT_AVAILABLE, TIMESTAMP_FORMAT, TransferOutcome, TransferRecord, parse_file_size,
};

use crate::{failed, success};

/// Line header: `2024-05-01T08:00:00Z`
static TIMESTAMP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z)").unwrap());

/// Size token: number with an optional binary unit
static SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+(?:\.\d+)?(?:[KMGT]B|B)?").unwrap());

/// First `src --> dst,` pair of the payload
static PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<src>[^,]+) --> (?P<dst>[^,]+),").unwrap());

static COST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cost \[(?P<value>\d+)\]").unwrap());

static STATUS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"status \[(?P<value>\d+)\]").unwrap());

static REQUEST_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"request id \[(?P<value>[^\]]+)\]").unwrap());

/// Markers of run banners and summaries shared by both dialects
const STRUCTURAL_MARKERS: &[&str] = &[
    "Start at",
    "End at",
    "Succeed count:",
    "Succeed bytes:",
    "Failed count:",
    "Failed bytes:",
];

/// Result of feeding one line to a dialect grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A data line that passed the acceptance rule.
    Record(TransferRecord),
    /// Blank line, banner, column header or summary.
    Structural,
    /// Not a usable data line.
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No `YYYY-MM-DDThh:mm:ssZ` header.
    MissingTimestamp,
    /// Header is shaped right but isn't a real date/time.
    InvalidTimestamp,
    /// Neither a usable path pair nor (failed dialect) an error message.
    MissingPaths,
}

/// Parse a single report line in the given dialect.
pub fn parse_line(line: &str, dialect: Dialect) -> LineOutcome {
    match dialect {
        Dialect::Success => success::parse_line(line),
        Dialect::Failed => failed::parse_line(line),
    }
}

pub(crate) fn is_structural(line: &str, column_header: &str) -> bool {
    line.is_empty()
        || line.contains(column_header)
        || STRUCTURAL_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Timestamp plus the rest of the line.
pub(crate) struct Header<'a> {
    pub timestamp: DateTime<Utc>,
    pub payload: &'a str,
}

pub(crate) fn split_header(line: &str) -> Result<Header<'_>, RejectReason> {
    let caps = TIMESTAMP_REGEX
        .captures(line)
        .ok_or(RejectReason::MissingTimestamp)?;
    let raw = &caps["ts"];

    let timestamp = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| RejectReason::InvalidTimestamp)?
        .and_utc();

    Ok(Header {
        timestamp,
        payload: line[raw.len()..].trim(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathPair {
    pub src: String,
    pub dst: String,
    /// Byte offset in the payload where the source side begins.
    pub offset: usize,
}

impl PathPair {
    pub fn is_complete(&self) -> bool {
        !self.src.is_empty() && !self.dst.is_empty()
    }
}

/// Tokens every dialect carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommonFields {
    pub file_size: String,
    pub file_size_bytes: u64,
    pub paths: Option<PathPair>,
    pub cost_ms: Option<i64>,
    pub status_code: String,
    pub request_id: String,
}

impl CommonFields {
    pub fn extract(payload: &str) -> Self {
        let file_size = size_token(payload);
        let file_size_bytes = parse_file_size(&file_size);

        Self {
            file_size,
            file_size_bytes,
            paths: path_pair(payload),
            cost_ms: capture(&COST_REGEX, payload).and_then(|v| v.parse().ok()),
            status_code: capture(&STATUS_REGEX, payload).unwrap_or_else(not_available),
            request_id: capture(&REQUEST_ID_REGEX, payload).unwrap_or_else(not_available),
        }
    }

    pub fn has_paths(&self) -> bool {
        self.paths.as_ref().is_some_and(PathPair::is_complete)
    }

    pub fn into_record(
        self,
        timestamp: DateTime<Utc>,
        md5: String,
        outcome: TransferOutcome,
    ) -> TransferRecord {
        let (src_path, dst_path) = match self.paths {
            Some(pair) => (pair.src, pair.dst),
            None => (String::new(), String::new()),
        };

        TransferRecord {
            timestamp,
            file_size: self.file_size,
            file_size_bytes: self.file_size_bytes,
            src_path,
            dst_path,
            cost_ms: self.cost_ms,
            status_code: self.status_code,
            request_id: self.request_id,
            md5,
            outcome,
        }
    }
}

/// Size is only looked for in the first comma-delimited field.
fn size_token(payload: &str) -> String {
    let first_field = payload.split(',').next().unwrap_or_default();
    SIZE_REGEX
        .find(first_field)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(not_available)
}

fn path_pair(payload: &str) -> Option<PathPair> {
    let caps = PATH_REGEX.captures(payload)?;
    let src = caps.name("src")?;
    let dst = caps.name("dst")?;

    Some(PathPair {
        src: src.as_str().trim().to_string(),
        dst: dst.as_str().trim().to_string(),
        offset: src.start(),
    })
}

/// Comma-delimited fields that precede the path pair.
pub(crate) fn leading_fields<'a>(payload: &'a str, paths: &PathPair) -> Vec<&'a str> {
    let prefix = &payload[..paths.offset];
    let mut fields: Vec<&str> = prefix.split(',').map(str::trim).collect();
    // whatever follows the last comma belongs to the source path
    fields.pop();
    fields
}

/// First capture group named `value`, if the pattern occurs.
pub(crate) fn capture(regex: &Regex, payload: &str) -> Option<String> {
    regex
        .captures(payload)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

pub(crate) fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

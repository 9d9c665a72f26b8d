use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::{StoredRecord, TransferStatus};
use crate::size::MIB;
use crate::{Error, Result};

/// Outcome filter: `all`, `success` or `failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl StatusFilter {
    pub fn status(&self) -> Option<TransferStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Success => Some(TransferStatus::Success),
            StatusFilter::Failed => Some(TransferStatus::Failed),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(StatusFilter::All),
            "success" => Ok(StatusFilter::Success),
            "failed" => Ok(StatusFilter::Failed),
            other => Err(Error::invalid("status filter", other)),
        }
    }
}

/// Size ranges over the stored byte count. Each range excludes its lower
/// bound and includes its upper bound: `1-10MB` is `(1 MiB, 10 MiB]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeBucket {
    #[default]
    All,
    UpTo1Mb,
    From1To10Mb,
    From10To100Mb,
    Over100Mb,
}

impl SizeBucket {
    /// `(exclusive lower, inclusive upper)` in bytes, `None` for `all`.
    pub fn bounds(&self) -> Option<(u64, Option<u64>)> {
        match self {
            SizeBucket::All => None,
            SizeBucket::UpTo1Mb => Some((0, Some(MIB))),
            SizeBucket::From1To10Mb => Some((MIB, Some(10 * MIB))),
            SizeBucket::From10To100Mb => Some((10 * MIB, Some(100 * MIB))),
            SizeBucket::Over100Mb => Some((100 * MIB, None)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBucket::All => "all",
            SizeBucket::UpTo1Mb => "0-1MB",
            SizeBucket::From1To10Mb => "1-10MB",
            SizeBucket::From10To100Mb => "10-100MB",
            SizeBucket::Over100Mb => "100MB+",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(SizeBucket::All),
            "0-1MB" => Ok(SizeBucket::UpTo1Mb),
            "1-10MB" => Ok(SizeBucket::From1To10Mb),
            "10-100MB" => Ok(SizeBucket::From10To100Mb),
            "100MB+" => Ok(SizeBucket::Over100Mb),
            other => Err(Error::invalid("size bucket", other)),
        }
    }
}

/// Duration ranges over `cost` in milliseconds, same bound convention as
/// [`SizeBucket`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationBucket {
    #[default]
    All,
    UpTo100Ms,
    From100To500Ms,
    Over500Ms,
}

impl DurationBucket {
    pub fn bounds(&self) -> Option<(i64, Option<i64>)> {
        match self {
            DurationBucket::All => None,
            DurationBucket::UpTo100Ms => Some((0, Some(100))),
            DurationBucket::From100To500Ms => Some((100, Some(500))),
            DurationBucket::Over500Ms => Some((500, None)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::All => "all",
            DurationBucket::UpTo100Ms => "0-100ms",
            DurationBucket::From100To500Ms => "100-500ms",
            DurationBucket::Over500Ms => "500ms+",
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(DurationBucket::All),
            "0-100ms" => Ok(DurationBucket::UpTo100Ms),
            "100-500ms" => Ok(DurationBucket::From100To500Ms),
            "500ms+" => Ok(DurationBucket::Over500Ms),
            other => Err(Error::invalid("duration bucket", other)),
        }
    }
}

/// Whole-day inclusive date range. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// First stored timestamp included by the range.
    pub fn lower_bound(&self) -> Option<String> {
        self.start
            .map(|date| format!("{}T00:00:00Z", date.format("%Y-%m-%d")))
    }

    /// Last stored timestamp included by the range (end of day).
    pub fn upper_bound(&self) -> Option<String> {
        self.end
            .map(|date| format!("{}T23:59:59Z", date.format("%Y-%m-%d")))
    }
}

/// Sortable columns. Anything outside this list sorts by timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Status,
    #[default]
    Timestamp,
    FileSizeBytes,
    SrcPath,
    DstPath,
    Cost,
    StatusCode,
}

impl SortColumn {
    /// Map a requested column name onto the allow-list.
    pub fn from_request(column: &str) -> Self {
        match column {
            "status" => SortColumn::Status,
            "timestamp" => SortColumn::Timestamp,
            "file_size_bytes" => SortColumn::FileSizeBytes,
            "src_path" => SortColumn::SrcPath,
            "dst_path" => SortColumn::DstPath,
            "cost" => SortColumn::Cost,
            "status_code" => SortColumn::StatusCode,
            _ => SortColumn::default(),
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::Status => "status",
            SortColumn::Timestamp => "timestamp",
            SortColumn::FileSizeBytes => "file_size_bytes",
            SortColumn::SrcPath => "src_path",
            SortColumn::DstPath => "dst_path",
            SortColumn::Cost => "cost",
            SortColumn::StatusCode => "status_code",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Only `asc` sorts ascending.
    pub fn from_request(direction: &str) -> Self {
        if direction == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl LogSort {
    pub fn from_request(column: &str, direction: &str) -> Self {
        Self {
            column: SortColumn::from_request(column),
            direction: SortDirection::from_request(direction),
        }
    }
}

/// Read-path filters. The default matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilters {
    pub status: StatusFilter,
    pub size: SizeBucket,
    pub duration: DurationBucket,
    pub date_range: DateRange,
    /// Free text, whitespace-tokenized.
    pub search: Option<String>,
}

impl LogFilters {
    /// Search tokens, empty when there is nothing to search for.
    pub fn search_terms(&self) -> Vec<&str> {
        self.search
            .as_deref()
            .map(|text| text.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn is_valid(&self) -> bool {
        self.page >= 1 && self.limit >= 1
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Complete read request: which page, which records, which order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    pub page: PageRequest,
    pub filters: LogFilters,
    pub sort: LogSort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPage {
    pub logs: Vec<StoredRecord>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bucket_bounds() {
        assert_eq!("1-10MB".parse::<SizeBucket>().unwrap().bounds(), Some((MIB, Some(10 * MIB))));
        assert_eq!("100MB+".parse::<SizeBucket>().unwrap().bounds(), Some((100 * MIB, None)));
        assert_eq!(SizeBucket::All.bounds(), None);
        assert!("5MB".parse::<SizeBucket>().is_err());
    }

    #[test]
    fn test_duration_bucket_parse() {
        assert_eq!(
            "100-500ms".parse::<DurationBucket>().unwrap(),
            DurationBucket::From100To500Ms
        );
        assert_eq!(DurationBucket::Over500Ms.bounds(), Some((500, None)));
        assert!("fast".parse::<DurationBucket>().is_err());
    }

    #[test]
    fn test_unknown_sort_column_falls_back_to_timestamp() {
        let sort = LogSort::from_request("file_size; DROP TABLE logs", "sideways");
        assert_eq!(sort.column, SortColumn::Timestamp);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = LogSort::from_request("cost", "asc");
        assert_eq!(sort.column, SortColumn::Cost);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_date_range_covers_whole_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1),
            NaiveDate::from_ymd_opt(2024, 3, 2),
        );
        assert_eq!(range.lower_bound().as_deref(), Some("2024-03-01T00:00:00Z"));
        assert_eq!(range.upper_bound().as_deref(), Some("2024-03-02T23:59:59Z"));
        assert_eq!(DateRange::default().lower_bound(), None);
    }

    #[test]
    fn test_pagination_math() {
        let page = PageRequest::new(3, 20);
        assert_eq!(page.offset(), 40);

        let pagination = Pagination::new(45, page);
        assert_eq!(pagination.total_pages, 3);

        assert_eq!(Pagination::new(0, PageRequest::default()).total_pages, 0);
        assert_eq!(Pagination::new(40, PageRequest::new(1, 20)).total_pages, 2);
    }

    #[test]
    fn test_page_request_validity() {
        assert!(PageRequest::default().is_valid());
        assert!(!PageRequest::new(0, 20).is_valid());
        assert!(!PageRequest::new(1, 0).is_valid());
    }

    #[test]
    fn test_search_terms_split_on_whitespace() {
        let filters = LogFilters {
            search: Some("  alpha\tbeta  gamma ".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.search_terms(), vec!["alpha", "beta", "gamma"]);
        assert!(LogFilters::default().search_terms().is_empty());
    }
}

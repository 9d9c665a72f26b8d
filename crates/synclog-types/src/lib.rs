// Shared domain model for synclog
// Leaf crate: no I/O, no storage

pub mod error;
pub mod filter;
pub mod record;
pub mod size;

pub use error::{Error, Result};
pub use filter::{
    DateRange, DurationBucket, LogFilters, LogPage, LogQuery, LogSort, PageRequest, Pagination,
    SizeBucket, SortColumn, SortDirection, StatusFilter,
};
pub use record::{
    Dialect, LogFile, LogFileListing, LogStats, NOT_AVAILABLE, StoredRecord, TransferOutcome,
    TransferRecord, TransferStatus, TIMESTAMP_FORMAT,
};
pub use size::{GIB, KIB, MAX_FILE_SIZE, MIB, TIB, parse_file_size};

use std::fmt;
use std::time::Duration;

/// Result type for synclog-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the index layer
#[derive(Debug)]
pub enum Error {
    /// Database operation failed
    Database(rusqlite::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Query-specific error (invalid input, corrupt row, etc.)
    Query(String),

    /// Database was created by an incompatible version
    SchemaMismatch { found: i32, expected: i32 },

    /// No pooled connection became free in time
    PoolTimeout(Duration),

    /// Page or page size below 1
    InvalidPagination { page: u32, limit: u32 },
}

impl Error {
    /// True when the underlying failure is a UNIQUE constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(err) => is_unique_violation(err),
            _ => false,
        }
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => write!(f, "Database error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Query(msg) => write!(f, "Query error: {}", msg),
            Error::SchemaMismatch { found, expected } => write!(
                f,
                "Database schema version {} is not supported (expected {}). Point --data-dir at a fresh directory.",
                found, expected
            ),
            Error::PoolTimeout(waited) => write!(
                f,
                "Timed out after {}ms waiting for a database connection",
                waited.as_millis()
            ),
            Error::InvalidPagination { page, limit } => write!(
                f,
                "Invalid pagination: page {} with limit {} (both must be at least 1)",
                page, limit
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Query(_)
            | Error::SchemaMismatch { .. }
            | Error::PoolTimeout(_)
            | Error::InvalidPagination { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detected() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: log_files.filename".to_string()),
        );
        let err = Error::Database(sqlite_err);

        assert!(err.is_unique_violation());
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_other_constraint_is_not_unique_violation() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK),
            Some("CHECK constraint failed".to_string()),
        );

        assert!(!Error::Database(sqlite_err).is_unique_violation());
        assert!(!Error::Query("nope".to_string()).is_unique_violation());
    }

    #[test]
    fn test_schema_mismatch_message() {
        let msg = Error::SchemaMismatch {
            found: 7,
            expected: 1,
        }
        .to_string();

        assert!(msg.contains("version 7"));
        assert!(msg.contains("expected 1"));
    }
}

use chrono::Utc;
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use synclog_types::{
    Dialect, LogFile, LogFileListing, LogPage, LogQuery, LogStats, Pagination, StoredRecord,
    TIMESTAMP_FORMAT, TransferRecord,
};

use crate::error::is_unique_violation;
use crate::filter::build_query;
use crate::pool::{ConnectionPool, PooledConnection};
use crate::queries::{log_file, log_record, stats};
use crate::{Error, Result, schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Connections kept open for the lifetime of the database.
    pub pool_size: usize,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long SQLite retries a locked database before giving up.
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            pool_size: 10,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of writing one log file and its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted { log_file_id: i64, record_count: usize },
    /// Another writer committed a log file with the same name first.
    AlreadyExists,
}

/// Handle to the record store. Cheap to share behind an `Arc`; every
/// operation borrows a pooled connection for its duration.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with(db_path, DatabaseOptions::default())
    }

    pub fn open_with(db_path: &Path, options: DatabaseOptions) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let first = open_file_connection(db_path, &options)?;
        schema::init_schema(&first)?;

        let mut connections = vec![first];
        for _ in 1..options.pool_size.max(1) {
            connections.push(open_file_connection(db_path, &options)?);
        }

        tracing::debug!(
            path = %db_path.display(),
            pool_size = connections.len(),
            "opened database"
        );

        Ok(Self {
            pool: ConnectionPool::new(connections, options.acquire_timeout),
        })
    }

    /// Private in-memory store. A single connection, since every in-memory
    /// connection would otherwise see its own empty database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::init_schema(&conn)?;

        Ok(Self {
            pool: ConnectionPool::new(vec![conn], DatabaseOptions::default().acquire_timeout),
        })
    }

    /// Borrow a raw connection from the pool.
    pub fn connection(&self) -> Result<PooledConnection<'_>> {
        self.pool.get()
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    // Write path

    pub fn find_log_file(&self, filename: &str) -> Result<Option<LogFile>> {
        let conn = self.connection()?;
        log_file::find_by_name(&conn, filename)
    }

    /// Write a log file row and all its records in one transaction.
    ///
    /// A concurrent writer that already committed the same filename yields
    /// [`InsertOutcome::AlreadyExists`] and nothing is written. Any other
    /// failure rolls the whole batch back.
    pub fn insert_log_file_with_records(
        &self,
        filename: &str,
        dialect: Dialect,
        records: &[TransferRecord],
    ) -> Result<InsertOutcome> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let created_at = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let log_file_id = match log_file::insert(&tx, filename, dialect, &created_at) {
            Ok(id) => id,
            Err(err) if is_unique_violation(&err) => return Ok(InsertOutcome::AlreadyExists),
            Err(err) => return Err(err.into()),
        };

        let record_count = log_record::insert_all(&tx, log_file_id, records)?;
        tx.commit()?;

        Ok(InsertOutcome::Inserted {
            log_file_id,
            record_count,
        })
    }

    // Read path

    pub fn list_log_files(&self) -> Result<Vec<LogFile>> {
        let conn = self.connection()?;
        log_file::list(&conn)
    }

    /// Imported filenames grouped by dialect, newest first.
    pub fn log_file_listing(&self) -> Result<LogFileListing> {
        let mut listing = LogFileListing::default();
        for file in self.list_log_files()? {
            match file.file_type {
                Dialect::Success => listing.success_files.push(file.filename),
                Dialect::Failed => listing.failed_files.push(file.filename),
            }
        }
        Ok(listing)
    }

    pub fn imported_filenames(&self) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        log_file::filenames(&conn)
    }

    pub fn get_log_by_id(&self, id: i64) -> Result<Option<StoredRecord>> {
        let conn = self.connection()?;
        log_record::get_by_id(&conn, id)
    }

    /// One page of filtered, sorted records plus the total match count.
    ///
    /// The count and the page are read in one transaction so they agree.
    pub fn query_logs(&self, query: &LogQuery) -> Result<LogPage> {
        let plan = build_query(query)?;

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let total = log_record::count(&tx, &plan.filters)?;
        let logs = log_record::page(&tx, &plan)?;
        tx.commit()?;

        Ok(LogPage {
            logs,
            pagination: Pagination::new(total, query.page),
        })
    }

    pub fn count_logs(&self) -> Result<u64> {
        let conn = self.connection()?;
        log_record::count_all(&conn)
    }

    pub fn stats(&self) -> Result<LogStats> {
        let conn = self.connection()?;
        stats::aggregate(&conn)
    }
}

fn open_file_connection(db_path: &Path, options: &DatabaseOptions) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(options.busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        return Err(Error::Query(format!(
            "could not enable WAL journal mode (got '{}')",
            mode
        )));
    }

    Ok(conn)
}

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use synclog_types::{StoredRecord, TIMESTAMP_FORMAT, TransferRecord, TransferStatus};

use crate::Result;
use crate::filter::{FilterConditions, QueryPlan, SqlValue};

const RECORD_COLUMNS: &str = r#"
    l.id, f.filename, l.timestamp, l.status, l.file_size, l.file_size_bytes,
    l.src_path, l.dst_path, l.cost, l.status_code, l.message, l.request_id,
    l.md5, l.error_code, l.error_message
"#;

/// Insert every record under one log file. Runs inside the caller's transaction.
pub fn insert_all(
    conn: &Connection,
    log_file_id: i64,
    records: &[TransferRecord],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO logs (log_file_id, timestamp, status, file_size, file_size_bytes,
                          src_path, dst_path, cost, status_code, message, request_id,
                          md5, error_code, error_message)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )?;

    for record in records {
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let file_size_bytes = i64::try_from(record.file_size_bytes).unwrap_or(i64::MAX);

        stmt.execute(params![
            log_file_id,
            timestamp,
            record.status().as_str(),
            &record.file_size,
            file_size_bytes,
            &record.src_path,
            &record.dst_path,
            record.cost_ms,
            &record.status_code,
            record.outcome.message(),
            &record.request_id,
            &record.md5,
            record.outcome.error_code(),
            record.outcome.error_message(),
        ])?;
    }

    Ok(records.len())
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<StoredRecord>> {
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM logs l
        JOIN log_files f ON l.log_file_id = f.id
        WHERE l.id = ?1
        "#
    );

    let record = conn.query_row(&query, [id], map_row).optional()?;
    Ok(record)
}

pub fn count(conn: &Connection, filters: &FilterConditions) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM logs l {}", filters.where_clause());

    let param_refs = as_params(&filters.params);
    let total: i64 = conn.query_row(&query, param_refs.as_slice(), |row| row.get(0))?;

    Ok(u64::try_from(total).unwrap_or_default())
}

pub fn page(conn: &Connection, plan: &QueryPlan) -> Result<Vec<StoredRecord>> {
    let query = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM logs l
        JOIN log_files f ON l.log_file_id = f.id
        {}
        ORDER BY {}
        LIMIT ? OFFSET ?
        "#,
        plan.filters.where_clause(),
        plan.order_by
    );

    let params = plan.page_params();
    let param_refs = as_params(&params);

    let mut stmt = conn.prepare(&query)?;
    let records = stmt
        .query_map(param_refs.as_slice(), map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn count_all(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

fn as_params(params: &[SqlValue]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let status: String = row.get(3)?;
    let status = status.parse::<TransferStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(StoredRecord {
        id: row.get(0)?,
        log_file: row.get(1)?,
        timestamp: row.get(2)?,
        status,
        file_size: row.get(4)?,
        file_size_bytes: row.get(5)?,
        src_path: row.get(6)?,
        dst_path: row.get(7)?,
        cost: row.get(8)?,
        status_code: row.get(9)?,
        message: row.get(10)?,
        request_id: row.get(11)?,
        md5: row.get(12)?,
        error_code: row.get(13)?,
        error_message: row.get(14)?,
    })
}

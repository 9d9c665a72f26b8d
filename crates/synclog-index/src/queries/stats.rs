use rusqlite::Connection;
use synclog_types::LogStats;

use crate::Result;

/// Sums of integers below 2^53 are exact in an f64 accumulator.
const EXACT_TOTAL_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Totals in a single pass. Byte total counts successful transfers only and
/// saturates at `i64::MAX` instead of overflowing.
pub fn aggregate(conn: &Connection) -> Result<LogStats> {
    let (mut stats, byte_total) = conn.query_row(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
            TOTAL(CASE WHEN status = 'success' AND file_size_bytes > 0
                       THEN file_size_bytes ELSE 0 END)
        FROM logs
        "#,
        [],
        |row| {
            let stats = LogStats {
                total_logs: row.get(0)?,
                success_logs: row.get(1)?,
                failed_logs: row.get(2)?,
                total_size: 0,
            };
            Ok((stats, row.get::<_, f64>(3)?))
        },
    )?;

    stats.total_size = if byte_total < EXACT_TOTAL_LIMIT {
        byte_total as i64
    } else {
        saturating_byte_total(conn)?
    };

    Ok(stats)
}

fn saturating_byte_total(conn: &Connection) -> Result<i64> {
    let mut stmt = conn.prepare(
        "SELECT file_size_bytes FROM logs WHERE status = 'success' AND file_size_bytes > 0",
    )?;

    let mut total: i64 = 0;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        total = total.saturating_add(row.get::<_, i64>(0)?);
    }
    Ok(total)
}

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashSet;
use synclog_types::{Dialect, LogFile};

use crate::Result;

pub fn insert(
    conn: &Connection,
    filename: &str,
    dialect: Dialect,
    created_at: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        r#"
        INSERT INTO log_files (filename, file_type, created_at)
        VALUES (?1, ?2, ?3)
        "#,
        params![filename, dialect.as_str(), created_at],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn find_by_name(conn: &Connection, filename: &str) -> Result<Option<LogFile>> {
    let file = conn
        .query_row(
            r#"
            SELECT id, filename, file_type, created_at
            FROM log_files
            WHERE filename = ?1
            "#,
            [filename],
            map_row,
        )
        .optional()?;

    Ok(file)
}

/// All imported files, newest first.
pub fn list(conn: &Connection) -> Result<Vec<LogFile>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, filename, file_type, created_at
        FROM log_files
        ORDER BY created_at DESC, id DESC
        "#,
    )?;

    let files = stmt
        .query_map([], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(files)
}

pub fn filenames(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT filename FROM log_files")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<HashSet<String>, _>>()?;

    Ok(names)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<LogFile> {
    let file_type: String = row.get(2)?;
    let file_type = file_type.parse::<Dialect>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(LogFile {
        id: row.get(0)?,
        filename: row.get(1)?,
        file_type,
        created_at: row.get(3)?,
    })
}

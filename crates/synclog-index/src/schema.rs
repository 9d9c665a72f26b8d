use rusqlite::Connection;

use crate::{Error, Result};

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

// Imported records are the only copy once the source file is deleted,
// so an unknown version is refused rather than rebuilt.

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != 0 && current_version != SCHEMA_VERSION {
        return Err(Error::SchemaMismatch {
            found: current_version,
            expected: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL UNIQUE,
            file_type TEXT NOT NULL CHECK (file_type IN ('success', 'failed')),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            log_file_id INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('success', 'failed')),
            file_size TEXT NOT NULL,
            file_size_bytes INTEGER NOT NULL CHECK (file_size_bytes >= 0),
            src_path TEXT NOT NULL,
            dst_path TEXT NOT NULL,
            cost INTEGER,
            status_code TEXT NOT NULL,
            message TEXT,
            request_id TEXT NOT NULL,
            md5 TEXT NOT NULL,
            error_code TEXT,
            error_message TEXT,
            FOREIGN KEY (log_file_id) REFERENCES log_files(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
        CREATE INDEX IF NOT EXISTS idx_logs_status ON logs(status);
        CREATE INDEX IF NOT EXISTS idx_logs_size ON logs(file_size_bytes);
        CREATE INDEX IF NOT EXISTS idx_logs_cost ON logs(cost);
        CREATE INDEX IF NOT EXISTS idx_logs_file ON logs(log_file_id);

        CREATE VIRTUAL TABLE IF NOT EXISTS logs_fts USING fts5(
            src_path,
            dst_path,
            message,
            error_message,
            request_id,
            content='logs',
            content_rowid='id'
        );

        CREATE TRIGGER IF NOT EXISTS logs_fts_insert AFTER INSERT ON logs BEGIN
            INSERT INTO logs_fts(rowid, src_path, dst_path, message, error_message, request_id)
            VALUES (new.id, new.src_path, new.dst_path, new.message, new.error_message, new.request_id);
        END;

        CREATE TRIGGER IF NOT EXISTS logs_fts_delete AFTER DELETE ON logs BEGIN
            INSERT INTO logs_fts(logs_fts, rowid, src_path, dst_path, message, error_message, request_id)
            VALUES ('delete', old.id, old.src_path, old.dst_path, old.message, old.error_message, old.request_id);
        END;
        "#,
    )?;

    if current_version == 0 {
        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
    }

    Ok(())
}

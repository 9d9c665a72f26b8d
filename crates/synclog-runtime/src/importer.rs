use serde::Serialize;
use std::path::{Path, PathBuf};
use synclog_index::{Database, InsertOutcome};
use synclog_parser::parse_content;
use synclog_types::Dialect;

use crate::fs::{SourceFiles, file_name, read_text};
use crate::{Error, Result};

/// Result of importing one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The filename is already in the store; nothing was read or deleted.
    AlreadyImported { log_file_id: i64 },
    Imported {
        log_file_id: i64,
        record_count: usize,
        /// Set when the source file could not be deleted after commit.
        cleanup_warning: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyImported,
    /// Name matches neither dialect prefix.
    UnknownPrefix,
}

#[derive(Debug, Clone)]
pub enum ImportProgress {
    Scanning {
        dir: PathBuf,
        candidates: usize,
    },
    FileSkipped {
        filename: String,
        reason: SkipReason,
    },
    FileImported {
        filename: String,
        dialect: Dialect,
        record_count: usize,
    },
    CleanupFailed {
        filename: String,
        error: String,
    },
    FileFailed {
        filename: String,
        error: String,
    },
    Completed {
        imported: usize,
        skipped: usize,
        failed: usize,
    },
}

/// One file handled by `import_all` without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub log_file_id: i64,
    pub record_count: usize,
    pub already_imported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub filename: String,
    pub error: String,
}

/// Per-file outcomes of a directory sweep, successes grouped by dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchImportResult {
    pub success: Vec<FileReport>,
    pub failed: Vec<FileReport>,
    pub errors: Vec<FileError>,
}

impl BatchImportResult {
    pub fn imported_count(&self) -> usize {
        self.reports().filter(|r| !r.already_imported).count()
    }

    pub fn record_count(&self) -> usize {
        self.reports().map(|r| r.record_count).sum()
    }

    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.success.iter().chain(self.failed.iter())
    }
}

/// Filename prefixes that decide the dialect of a file in a sweep.
#[derive(Debug, Clone, Copy)]
pub struct Prefixes<'p> {
    pub success: &'p str,
    pub failed: &'p str,
}

pub struct Importer<'a> {
    db: &'a Database,
    files: &'a dyn SourceFiles,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database, files: &'a dyn SourceFiles) -> Self {
        Self { db, files }
    }

    /// Import one file at most once, keyed by its filename.
    ///
    /// The source file is deleted only after the records are committed;
    /// a failed deletion is reported in the outcome, not as an error.
    pub fn import_file(&self, path: &Path, dialect: Dialect) -> Result<ImportOutcome> {
        let filename = file_name(path).ok_or_else(|| {
            Error::InvalidOperation(format!("not a file path: {}", path.display()))
        })?;

        if let Some(existing) = self.db.find_log_file(&filename)? {
            tracing::debug!(filename = %filename, log_file_id = existing.id, "already imported");
            return Ok(ImportOutcome::AlreadyImported {
                log_file_id: existing.id,
            });
        }

        let content = read_text(self.files, path)?;

        let parsed = parse_content(&content, dialect);
        tracing::debug!(
            filename = %filename,
            lines = parsed.summary.lines,
            accepted = parsed.summary.accepted,
            structural = parsed.summary.structural,
            rejected = parsed.summary.rejected,
            "parsed source file"
        );

        let (log_file_id, record_count) =
            match self
                .db
                .insert_log_file_with_records(&filename, dialect, &parsed.records)?
            {
                InsertOutcome::Inserted {
                    log_file_id,
                    record_count,
                } => (log_file_id, record_count),
                InsertOutcome::AlreadyExists => return self.lost_race(&filename),
            };

        tracing::info!(
            filename = %filename,
            dialect = %dialect,
            record_count,
            "imported log file"
        );

        let cleanup_warning = match self.files.remove(path) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(
                    filename = %filename,
                    path = %path.display(),
                    error = %err,
                    "imported but could not delete source file"
                );
                Some(format!("could not delete {}: {}", path.display(), err))
            }
        };

        Ok(ImportOutcome::Imported {
            log_file_id,
            record_count,
            cleanup_warning,
        })
    }

    /// Import every file in `dir` whose name carries a dialect prefix.
    ///
    /// Success-dialect files go first, each group in name order. A failing
    /// file is recorded in `errors` and the sweep moves on.
    pub fn import_all<F>(
        &self,
        dir: &Path,
        prefixes: Prefixes<'_>,
        mut on_progress: F,
    ) -> Result<BatchImportResult>
    where
        F: FnMut(ImportProgress),
    {
        let listed = self.files.list(dir)?;
        on_progress(ImportProgress::Scanning {
            dir: dir.to_path_buf(),
            candidates: listed.len(),
        });

        let mut queue: Vec<(PathBuf, String, Dialect)> = Vec::new();
        let mut skipped = 0;
        for path in listed {
            let Some(filename) = file_name(&path) else {
                continue;
            };
            match Dialect::classify(&filename, prefixes.success, prefixes.failed) {
                Some(dialect) => queue.push((path, filename, dialect)),
                None => {
                    skipped += 1;
                    on_progress(ImportProgress::FileSkipped {
                        filename,
                        reason: SkipReason::UnknownPrefix,
                    });
                }
            }
        }
        // stable sort keeps name order within each dialect
        queue.sort_by_key(|(_, _, dialect)| *dialect == Dialect::Failed);

        let mut result = BatchImportResult::default();
        for (path, filename, dialect) in queue {
            let report = match self.import_file(&path, dialect) {
                Ok(ImportOutcome::AlreadyImported { log_file_id }) => {
                    skipped += 1;
                    on_progress(ImportProgress::FileSkipped {
                        filename: filename.clone(),
                        reason: SkipReason::AlreadyImported,
                    });
                    FileReport {
                        filename,
                        log_file_id,
                        record_count: 0,
                        already_imported: true,
                        cleanup_warning: None,
                    }
                }
                Ok(ImportOutcome::Imported {
                    log_file_id,
                    record_count,
                    cleanup_warning,
                }) => {
                    on_progress(ImportProgress::FileImported {
                        filename: filename.clone(),
                        dialect,
                        record_count,
                    });
                    if let Some(warning) = &cleanup_warning {
                        on_progress(ImportProgress::CleanupFailed {
                            filename: filename.clone(),
                            error: warning.clone(),
                        });
                    }
                    FileReport {
                        filename,
                        log_file_id,
                        record_count,
                        already_imported: false,
                        cleanup_warning,
                    }
                }
                Err(err) => {
                    tracing::error!(filename = %filename, error = %err, "failed to import log file");
                    on_progress(ImportProgress::FileFailed {
                        filename: filename.clone(),
                        error: err.to_string(),
                    });
                    result.errors.push(FileError {
                        filename,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            match dialect {
                Dialect::Success => result.success.push(report),
                Dialect::Failed => result.failed.push(report),
            }
        }

        on_progress(ImportProgress::Completed {
            imported: result.imported_count(),
            skipped,
            failed: result.errors.len(),
        });

        Ok(result)
    }

    /// Another writer committed the same filename between our lookup and
    /// our insert. Their import stands; the source file is theirs to delete.
    fn lost_race(&self, filename: &str) -> Result<ImportOutcome> {
        tracing::warn!(filename = %filename, "log file was imported concurrently");

        let existing = self.db.find_log_file(filename)?.ok_or_else(|| {
            Error::InvalidOperation(format!(
                "{} conflicted on insert but is not in the store",
                filename
            ))
        })?;

        Ok(ImportOutcome::AlreadyImported {
            log_file_id: existing.id,
        })
    }
}

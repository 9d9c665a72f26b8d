use crate::output::{print_csv, print_json};
use crate::types::OutputFormat;
use anyhow::{Result, bail};
use serde::Serialize;
use std::path::Path;
use synclog_runtime::{BatchImportResult, ImportOutcome, ImportProgress, SkipReason, Synclog};
use synclog_types::Dialect;

/// One row of import output, shared by the single-file and sweep commands.
#[derive(Debug, Serialize)]
struct ImportRow {
    filename: String,
    dialect: Option<Dialect>,
    status: &'static str,
    log_file_id: Option<i64>,
    record_count: usize,
    message: Option<String>,
}

pub fn handle_file(
    synclog: &Synclog,
    name: &str,
    dialect: Option<Dialect>,
    format: OutputFormat,
) -> Result<()> {
    let sources = &synclog.config().sources;
    let dialect = match dialect
        .or_else(|| Dialect::classify(name, &sources.success_prefix, &sources.failed_prefix))
    {
        Some(dialect) => dialect,
        None => bail!(
            "Cannot tell the dialect of '{}' from its name; pass --dialect success|failed",
            name
        ),
    };

    let outcome = synclog.import_file(name, dialect)?;
    let row = outcome_row(name, dialect, &outcome);

    match format {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Csv => print_csv(&[row]),
        OutputFormat::Plain => {
            match &outcome {
                ImportOutcome::AlreadyImported { log_file_id } => {
                    println!("{} was already imported (log file #{})", name, log_file_id);
                }
                ImportOutcome::Imported {
                    log_file_id,
                    record_count,
                    cleanup_warning,
                } => {
                    println!(
                        "Imported {} as log file #{}: {} records",
                        name, log_file_id, record_count
                    );
                    if let Some(warning) = cleanup_warning {
                        println!("Warning: {}", warning);
                    }
                }
            }
            Ok(())
        }
    }
}

pub fn handle_all(synclog: &Synclog, dir: Option<&Path>, format: OutputFormat) -> Result<()> {
    let plain = format == OutputFormat::Plain;

    let result = synclog.import_all(dir, |progress| {
        if plain {
            render_progress(progress);
        }
    })?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Csv => print_csv(&batch_rows(&result)),
        OutputFormat::Plain => Ok(()),
    }
}

fn render_progress(progress: ImportProgress) {
    match progress {
        ImportProgress::Scanning { dir, candidates } => {
            println!("Scanning {} ({} files)", dir.display(), candidates);
        }
        ImportProgress::FileSkipped { filename, reason } => match reason {
            SkipReason::AlreadyImported => println!("  skip    {} (already imported)", filename),
            SkipReason::UnknownPrefix => println!("  skip    {} (not a sync report)", filename),
        },
        ImportProgress::FileImported {
            filename,
            dialect,
            record_count,
        } => println!("  import  {} [{}] {} records", filename, dialect, record_count),
        ImportProgress::CleanupFailed { filename, error } => {
            println!("  warning {}: {}", filename, error);
        }
        ImportProgress::FileFailed { filename, error } => {
            println!("  error   {}: {}", filename, error);
        }
        ImportProgress::Completed {
            imported,
            skipped,
            failed,
        } => println!(
            "Done: {} imported, {} skipped, {} failed",
            imported, skipped, failed
        ),
    }
}

fn outcome_row(filename: &str, dialect: Dialect, outcome: &ImportOutcome) -> ImportRow {
    match outcome {
        ImportOutcome::AlreadyImported { log_file_id } => ImportRow {
            filename: filename.to_string(),
            dialect: Some(dialect),
            status: "already_imported",
            log_file_id: Some(*log_file_id),
            record_count: 0,
            message: None,
        },
        ImportOutcome::Imported {
            log_file_id,
            record_count,
            cleanup_warning,
        } => ImportRow {
            filename: filename.to_string(),
            dialect: Some(dialect),
            status: "imported",
            log_file_id: Some(*log_file_id),
            record_count: *record_count,
            message: cleanup_warning.clone(),
        },
    }
}

fn batch_rows(result: &BatchImportResult) -> Vec<ImportRow> {
    let grouped = [
        (Dialect::Success, &result.success),
        (Dialect::Failed, &result.failed),
    ];

    let mut rows: Vec<ImportRow> = grouped
        .into_iter()
        .flat_map(|(dialect, reports)| {
            reports.iter().map(move |report| ImportRow {
                filename: report.filename.clone(),
                dialect: Some(dialect),
                status: if report.already_imported {
                    "already_imported"
                } else {
                    "imported"
                },
                log_file_id: Some(report.log_file_id),
                record_count: report.record_count,
                message: report.cleanup_warning.clone(),
            })
        })
        .collect();

    rows.extend(result.errors.iter().map(|err| ImportRow {
        filename: err.filename.clone(),
        dialect: None,
        status: "error",
        log_file_id: None,
        record_count: 0,
        message: Some(err.error.clone()),
    }));

    rows
}

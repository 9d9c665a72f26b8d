use crate::types::{LogFormat, LogLevel, OutputFormat};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use synclog_types::{Dialect, DurationBucket, SizeBucket, StatusFilter};

#[derive(Parser)]
#[command(name = "synclog")]
#[command(about = "Import sync transfer reports into SQLite and query them", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory [default: $SYNCLOG_PATH, then the XDG data dir]
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config.toml and create the database
    Init,

    /// Import every report in the import directory
    Import {
        /// Directory to sweep instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Import one report from the import directory
    ImportFile {
        /// Bare filename, e.g. sync_succeed_20240501.txt
        name: String,

        /// success or failed [default: from the filename prefix]
        #[arg(long)]
        dialect: Option<Dialect>,
    },

    /// List reports waiting in the success/failed directories
    Importable,

    /// Print a report from the import directory without importing it
    Cat {
        /// Bare filename, e.g. sync_failed_20240501.txt
        name: String,
    },

    /// List imported reports, newest first
    Files,

    /// Query imported records
    Logs {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// all, success or failed
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// all, 0-1MB, 1-10MB, 10-100MB or 100MB+
        #[arg(long, default_value = "all")]
        size: SizeBucket,

        /// all, 0-100ms, 100-500ms or 500ms+
        #[arg(long, default_value = "all")]
        duration: DurationBucket,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Whitespace-separated terms, all of which must match
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "timestamp")]
        sort: String,

        /// asc or desc
        #[arg(long, default_value = "desc")]
        direction: String,
    },

    /// Show one record
    Show { id: i64 },

    /// Record and byte totals
    Stats,
}

pub mod config;
pub mod error;
pub mod fs;
pub mod importer;
pub mod workspace;

pub use config::{Config, DatabaseConfig, QueryConfig, SourcesConfig, resolve_workspace_path};
pub use error::{Error, Result};
pub use fs::{ImportableFile, ImportableFiles, LocalFs, SourceFiles, list_importable_files};
pub use importer::{
    BatchImportResult, FileError, FileReport, ImportOutcome, ImportProgress, Importer, Prefixes,
    SkipReason,
};
pub use workspace::{InitResult, Synclog};

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use synclog_index::{Database, SCHEMA_VERSION};
use synclog_types::{Dialect, LogFileListing, LogPage, LogQuery, LogStats, StoredRecord};

use crate::config::{CONFIG_FILE, Config, resolve_in};
use crate::fs::{ImportableFiles, LocalFs, SourceFiles, list_importable_files, read_text};
use crate::importer::{BatchImportResult, ImportOutcome, ImportProgress, Importer, Prefixes};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct InitResult {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    /// False when an existing config.toml was kept.
    pub config_created: bool,
    pub db_path: PathBuf,
    pub schema_version: i32,
}

/// Entry point for outer layers: one data directory, its config, its store
/// and the source files it imports from.
pub struct Synclog {
    db: Arc<Database>,
    data_dir: PathBuf,
    config: Arc<Config>,
    files: Arc<dyn SourceFiles>,
}

impl Synclog {
    /// Write a default config if there is none, create the database and the
    /// source directories.
    pub fn init(data_dir: &Path) -> Result<InitResult> {
        let config_path = data_dir.join(CONFIG_FILE);
        let config_created = !config_path.exists();
        let config = Config::load_from(&config_path)?;
        if config_created {
            config.save_to(&config_path)?;
        }

        for dir in [
            &config.sources.import_dir,
            &config.sources.success_dir,
            &config.sources.failed_dir,
        ] {
            std::fs::create_dir_all(resolve_in(data_dir, dir))?;
        }

        let db_path = resolve_in(data_dir, &config.database.path);
        Database::open_with(&db_path, config.database_options())?;

        tracing::info!(data_dir = %data_dir.display(), config_created, "workspace initialized");

        Ok(InitResult {
            data_dir: data_dir.to_path_buf(),
            config_path,
            config_created,
            db_path,
            schema_version: SCHEMA_VERSION,
        })
    }

    pub fn open(data_dir: PathBuf) -> Result<Self> {
        Self::open_with_files(data_dir, Arc::new(LocalFs))
    }

    pub fn open_with_files(data_dir: PathBuf, files: Arc<dyn SourceFiles>) -> Result<Self> {
        let config = Config::load_from(&data_dir.join(CONFIG_FILE))?;
        let db_path = resolve_in(&data_dir, &config.database.path);
        let db = Database::open_with(&db_path, config.database_options())?;

        Ok(Self {
            db: Arc::new(db),
            data_dir,
            config: Arc::new(config),
            files,
        })
    }

    pub fn list_importable_files(&self) -> Result<ImportableFiles> {
        list_importable_files(
            self.files.as_ref(),
            &self.db,
            &self.success_dir(),
            &self.failed_dir(),
        )
    }

    /// Import `<import_dir>/<filename>` in the given dialect.
    pub fn import_file(&self, filename: &str, dialect: Dialect) -> Result<ImportOutcome> {
        let path = self.source_path(filename)?;
        self.importer().import_file(&path, dialect)
    }

    /// Raw text of `<import_dir>/<filename>`, decoded the way the importer
    /// decodes it.
    pub fn read_source(&self, filename: &str) -> Result<String> {
        let path = self.source_path(filename)?;
        read_text(self.files.as_ref(), &path)
    }

    /// Sweep `dir`, or the configured import directory.
    pub fn import_all<F>(&self, dir: Option<&Path>, on_progress: F) -> Result<BatchImportResult>
    where
        F: FnMut(ImportProgress),
    {
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.import_dir());
        let prefixes = Prefixes {
            success: &self.config.sources.success_prefix,
            failed: &self.config.sources.failed_prefix,
        };

        self.importer().import_all(&dir, prefixes, on_progress)
    }

    pub fn log_files(&self) -> Result<LogFileListing> {
        Ok(self.db.log_file_listing()?)
    }

    /// Page size is capped at `query.max_page_size`.
    pub fn query_logs(&self, query: &LogQuery) -> Result<LogPage> {
        let mut query = query.clone();
        query.page.limit = query.page.limit.min(self.config.query.max_page_size);
        Ok(self.db.query_logs(&query)?)
    }

    pub fn get_log_by_id(&self, id: i64) -> Result<StoredRecord> {
        self.db
            .get_log_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("log record {}", id)))
    }

    pub fn stats(&self) -> Result<LogStats> {
        Ok(self.db.stats()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn import_dir(&self) -> PathBuf {
        resolve_in(&self.data_dir, &self.config.sources.import_dir)
    }

    pub fn success_dir(&self) -> PathBuf {
        resolve_in(&self.data_dir, &self.config.sources.success_dir)
    }

    pub fn failed_dir(&self) -> PathBuf {
        resolve_in(&self.data_dir, &self.config.sources.failed_dir)
    }

    fn source_path(&self, filename: &str) -> Result<PathBuf> {
        if !is_bare_filename(filename) {
            return Err(Error::InvalidOperation(format!(
                "expected a bare filename, got '{}'",
                filename
            )));
        }
        Ok(self.import_dir().join(filename))
    }

    fn importer(&self) -> Importer<'_> {
        Importer::new(&self.db, self.files.as_ref())
    }
}

fn is_bare_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_filename() {
        assert!(is_bare_filename("sync_succeed_1.txt"));
        assert!(!is_bare_filename("../sync_succeed_1.txt"));
        assert!(!is_bare_filename("logs/sync_succeed_1.txt"));
        assert!(!is_bare_filename("/etc/passwd"));
        assert!(!is_bare_filename(""));
        assert!(!is_bare_filename(".."));
    }
}

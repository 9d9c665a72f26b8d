use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use synclog_index::Database;
use synclog_types::Dialect;
use walkdir::WalkDir;

use crate::{Error, Result};

/// Access to the directory of source report files.
///
/// The importer only reads, lists and deletes through this trait, so tests
/// can count deletions or make them fail.
pub trait SourceFiles: Send + Sync {
    /// Raw bytes of a source file. Decoding is the caller's concern.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Regular files directly inside `dir`, sorted by name. A missing
    /// directory has no files.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl SourceFiles for LocalFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportableFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub dialect: Dialect,
    pub path: PathBuf,
}

/// Files waiting in the per-dialect source directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportableFiles {
    pub success: Vec<ImportableFile>,
    pub failed: Vec<ImportableFile>,
}

impl ImportableFiles {
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failed.is_empty()
    }
}

/// List files in `success_dir` and `failed_dir` that haven't been imported
/// yet. The directory a file sits in decides its dialect.
pub fn list_importable_files(
    files: &dyn SourceFiles,
    db: &Database,
    success_dir: &Path,
    failed_dir: &Path,
) -> Result<ImportableFiles> {
    let imported = db.imported_filenames()?;

    let pending = |dir: &Path, dialect: Dialect| -> Result<Vec<ImportableFile>> {
        let listed = files.list(dir)?;
        Ok(listed
            .into_iter()
            .filter_map(|path| {
                let filename = file_name(&path)?;
                (!imported.contains(&filename)).then_some(ImportableFile {
                    filename,
                    dialect,
                    path,
                })
            })
            .collect())
    };

    Ok(ImportableFiles {
        success: pending(success_dir, Dialect::Success)?,
        failed: pending(failed_dir, Dialect::Failed)?,
    })
}

/// Read a report as text. Bytes that aren't UTF-8 become U+FFFD so one
/// badly encoded line can't hide the rest of the file.
pub(crate) fn read_text(files: &dyn SourceFiles, path: &Path) -> Result<String> {
    let bytes = files.read(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            Error::NotFound(format!("source file {}", path.display()))
        } else {
            Error::Io(err)
        }
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                valid_up_to = err.utf8_error().valid_up_to(),
                "source file is not valid UTF-8, decoding lossily"
            );
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

pub(crate) fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

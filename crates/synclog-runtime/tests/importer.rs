//! Importer behaviour against a scripted filesystem

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use synclog_index::Database;
use synclog_runtime::{
    Error, ImportOutcome, ImportProgress, Importer, Prefixes, SkipReason, SourceFiles,
};
use synclog_types::Dialect;

const SUCCESS_REPORT: &str = "\
Start at 2024-05-01 08:00:00
[file size, md5 value, src --> dst, cost(ms), status code, success message, request id]
2024-05-01T08:00:00Z 1.5MB, d41d8cd9, oss://bucket/a.bin --> /mnt/a.bin, cost [182], status [200], success message [upload ok], request id [R1]
2024-05-01T08:00:02Z 12MB, n/a, oss://bucket/b.bin --> /mnt/b.bin, cost [640], status [200], success message [upload ok], request id [R2]
Succeed count: 2
End at 2024-05-01 08:00:06
";

const FAILED_REPORT: &str = "\
[file size, src --> dst, cost(ms), status code, error code, error message, request id]
2024-05-01T08:01:03Z n/a, error code [InvalidAccessKeyId], error message [The access key id does not exist.], request id [R3]
Failed count: 1
";

const PREFIXES: Prefixes<'static> = Prefixes {
    success: "sync_succeed",
    failed: "sync_failed",
};

/// In-memory source directory that records every deletion attempt.
#[derive(Default)]
struct ScriptedFiles {
    contents: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    removals: Mutex<Vec<PathBuf>>,
    fail_removal: bool,
    unreadable: Vec<PathBuf>,
    /// Commits the same filename from "another process" during the read.
    race_with: Option<Arc<Database>>,
}

impl ScriptedFiles {
    fn with_file(self, path: &str, content: &str) -> Self {
        self.with_bytes(path, content.as_bytes())
    }

    fn with_bytes(self, path: &str, content: &[u8]) -> Self {
        self.contents
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_vec());
        self
    }

    fn removals(&self) -> Vec<PathBuf> {
        self.removals.lock().unwrap().clone()
    }

    fn exists(&self, path: &str) -> bool {
        self.contents.lock().unwrap().contains_key(Path::new(path))
    }
}

impl SourceFiles for ScriptedFiles {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.unreadable.iter().any(|p| p == path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }

        if let Some(db) = &self.race_with {
            let filename = path.file_name().unwrap().to_string_lossy();
            db.insert_log_file_with_records(&filename, Dialect::Success, &[])
                .unwrap();
        }

        self.contents
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.removals.lock().unwrap().push(path.to_path_buf());
        if self.fail_removal {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        self.contents.lock().unwrap().remove(path);
        Ok(())
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .contents
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

#[test]
fn test_import_deletes_source_exactly_once() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles::default().with_file("/in/sync_succeed_1.txt", SUCCESS_REPORT);
    let importer = Importer::new(&db, &files);

    let outcome = importer
        .import_file(Path::new("/in/sync_succeed_1.txt"), Dialect::Success)
        .unwrap();

    match outcome {
        ImportOutcome::Imported {
            record_count,
            cleanup_warning,
            ..
        } => {
            assert_eq!(record_count, 2);
            assert_eq!(cleanup_warning, None);
        }
        other => panic!("expected import, got {:?}", other),
    }
    assert_eq!(files.removals(), vec![PathBuf::from("/in/sync_succeed_1.txt")]);
    assert!(!files.exists("/in/sync_succeed_1.txt"));
    assert_eq!(db.count_logs().unwrap(), 2);
}

#[test]
fn test_reimport_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles::default().with_file("/in/sync_succeed_1.txt", SUCCESS_REPORT);
    let importer = Importer::new(&db, &files);
    let path = Path::new("/in/sync_succeed_1.txt");

    let first = importer.import_file(path, Dialect::Success).unwrap();
    let ImportOutcome::Imported { log_file_id, .. } = first else {
        panic!("expected import, got {:?}", first);
    };

    // the producer drops a file with the same name again
    let files = files.with_file("/in/sync_succeed_1.txt", SUCCESS_REPORT);
    let importer = Importer::new(&db, &files);
    let second = importer.import_file(path, Dialect::Success).unwrap();

    assert_eq!(second, ImportOutcome::AlreadyImported { log_file_id });
    assert_eq!(db.count_logs().unwrap(), 2);
    assert_eq!(files.removals().len(), 1);
    assert!(files.exists("/in/sync_succeed_1.txt"));
}

#[test]
fn test_cleanup_failure_is_a_warning() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles {
        fail_removal: true,
        ..Default::default()
    }
    .with_file("/in/sync_failed_1.txt", FAILED_REPORT);
    let importer = Importer::new(&db, &files);

    let outcome = importer
        .import_file(Path::new("/in/sync_failed_1.txt"), Dialect::Failed)
        .unwrap();

    match outcome {
        ImportOutcome::Imported {
            record_count,
            cleanup_warning: Some(warning),
            ..
        } => {
            assert_eq!(record_count, 1);
            assert!(warning.contains("/in/sync_failed_1.txt"));
        }
        other => panic!("expected import with warning, got {:?}", other),
    }
    assert_eq!(files.removals().len(), 1);
    assert_eq!(db.count_logs().unwrap(), 1);
}

#[test]
fn test_concurrent_import_counts_as_already_imported() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let files = ScriptedFiles {
        race_with: Some(Arc::clone(&db)),
        ..Default::default()
    }
    .with_file("/in/sync_succeed_race.txt", SUCCESS_REPORT);
    let importer = Importer::new(&db, &files);

    let outcome = importer
        .import_file(Path::new("/in/sync_succeed_race.txt"), Dialect::Success)
        .unwrap();

    let winner = db.find_log_file("sync_succeed_race.txt").unwrap().unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::AlreadyImported {
            log_file_id: winner.id
        }
    );
    // the winner owns the file; the loser neither wrote records nor deleted it
    assert!(files.removals().is_empty());
    assert_eq!(db.count_logs().unwrap(), 0);
}

#[test]
fn test_missing_source_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles::default();
    let importer = Importer::new(&db, &files);

    let result = importer.import_file(Path::new("/in/sync_succeed_gone.txt"), Dialect::Success);

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(db.find_log_file("sync_succeed_gone.txt").unwrap().is_none());
}

#[test]
fn test_import_all_continues_past_unreadable_file() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles {
        unreadable: vec![PathBuf::from("/in/sync_failed_0_locked.txt")],
        ..Default::default()
    }
    .with_file("/in/sync_failed_0_locked.txt", "")
    .with_file("/in/sync_failed_1.txt", FAILED_REPORT)
    .with_file("/in/sync_succeed_1.txt", SUCCESS_REPORT)
    .with_file("/in/readme.md", "not a report")
    .with_file("/elsewhere/sync_succeed_9.txt", SUCCESS_REPORT);
    let importer = Importer::new(&db, &files);

    let mut events = Vec::new();
    let result = importer
        .import_all(Path::new("/in"), PREFIXES, |event| events.push(event))
        .unwrap();

    assert_eq!(result.success.len(), 1);
    assert_eq!(result.success[0].filename, "sync_succeed_1.txt");
    assert_eq!(result.success[0].record_count, 2);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].record_count, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].filename, "sync_failed_0_locked.txt");
    assert_eq!(result.imported_count(), 2);
    assert_eq!(result.record_count(), 3);

    assert!(events.iter().any(|e| matches!(
        e,
        ImportProgress::FileSkipped {
            reason: SkipReason::UnknownPrefix,
            ..
        }
    )));
    assert!(matches!(
        events.last(),
        Some(ImportProgress::Completed {
            imported: 2,
            skipped: 1,
            failed: 1
        })
    ));

    // success files are swept before failed ones
    let imported: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ImportProgress::FileImported { filename, .. } => Some(filename.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(imported, vec!["sync_succeed_1.txt", "sync_failed_1.txt"]);

    // untouched: the unreadable file, the unknown file, the other directory
    assert!(files.exists("/in/sync_failed_0_locked.txt"));
    assert!(files.exists("/in/readme.md"));
    assert!(files.exists("/elsewhere/sync_succeed_9.txt"));
}

#[test]
fn test_badly_encoded_line_does_not_block_the_file() {
    let db = Database::open_in_memory().unwrap();
    let mut report = SUCCESS_REPORT.as_bytes().to_vec();
    // GBK-encoded directory name inside an otherwise valid line
    report.extend_from_slice(b"2024-05-01T08:00:09Z 2KB, n/a, oss://bucket/");
    report.extend_from_slice(&[0xd6, 0xd0, 0xce, 0xc4]);
    report.extend_from_slice(
        b"/c.txt --> /mnt/c.txt, cost [7], status [200], success message [ok], request id [R9]\n",
    );
    let files = ScriptedFiles::default().with_bytes("/in/sync_succeed_gbk.txt", &report);
    let importer = Importer::new(&db, &files);

    let outcome = importer
        .import_file(Path::new("/in/sync_succeed_gbk.txt"), Dialect::Success)
        .unwrap();

    assert!(matches!(
        outcome,
        ImportOutcome::Imported {
            record_count: 3,
            ..
        }
    ));
    assert_eq!(db.count_logs().unwrap(), 3);
    assert!(!files.exists("/in/sync_succeed_gbk.txt"));

    let page = db.query_logs(&Default::default()).unwrap();
    let damaged = page
        .logs
        .iter()
        .find(|log| log.request_id == "R9")
        .unwrap();
    assert!(damaged.src_path.contains('\u{FFFD}'));
    assert_eq!(damaged.dst_path, "/mnt/c.txt");
}

#[test]
fn test_import_all_on_missing_dir_is_empty() {
    let db = Database::open_in_memory().unwrap();
    let files = ScriptedFiles::default();
    let importer = Importer::new(&db, &files);

    let result = importer
        .import_all(Path::new("/nowhere"), PREFIXES, |_| {})
        .unwrap();

    assert_eq!(result, Default::default());
}

//! Shared fixture for the CLI integration tests.
#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SUCCESS_REPORT: &str = "sync_succeed_20240501.txt";
pub const FAILED_REPORT: &str = "sync_failed_20240501.txt";

pub struct TestFixture {
    _temp_dir: TempDir,
    data_dir: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("synclog");

        Self {
            _temp_dir: temp_dir,
            data_dir,
        }
    }

    /// Fixture with `init` already run.
    pub fn initialized() -> Self {
        let fixture = Self::new();
        fixture.command().arg("init").assert().success();
        fixture
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn import_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// `synclog --data-dir <tmp>` with the environment cleared of overrides.
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("synclog").expect("binary should be built");
        cmd.env_remove("SYNCLOG_PATH")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(&self.data_dir);
        cmd
    }

    /// Copy a parser sample into `dir` (relative to the data dir).
    pub fn place_sample(&self, name: &str, dir: &str) -> PathBuf {
        let source = samples_dir().join(name);
        let dest_dir = self.data_dir.join(dir);
        fs::create_dir_all(&dest_dir).expect("Failed to create source dir");

        let dest = dest_dir.join(name);
        fs::copy(&source, &dest).expect("Failed to copy sample report");
        dest
    }

    pub fn place_report(&self, name: &str) -> PathBuf {
        self.place_sample(name, "logs")
    }

    pub fn write_report(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.import_dir();
        fs::create_dir_all(&dir).expect("Failed to create import dir");
        let path = dir.join(name);
        fs::write(&path, content).expect("Failed to write report");
        path
    }

    /// Run with `--format json` and parse stdout.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .command()
            .args(["--format", "json"])
            .args(args)
            .output()
            .expect("Failed to run synclog");
        assert!(
            output.status.success(),
            "synclog {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
    }

    /// Both sample reports placed and imported.
    pub fn with_imported_samples() -> Self {
        let fixture = Self::initialized();
        fixture.place_report(SUCCESS_REPORT);
        fixture.place_report(FAILED_REPORT);
        fixture.command().arg("import").assert().success();
        fixture
    }
}

fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crate lives under crates/")
        .join("synclog-parser/tests/samples")
}

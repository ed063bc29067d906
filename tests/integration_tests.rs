//! Integration tests for the fetch -> patch -> build pipeline
//!
//! These tests drive `cli::run` with stubbed stages and verify stage ordering,
//! the on-disk patch results, and the single-line failure reporting.

use futures::future::BoxFuture;
use goliath::cli;
use goliath::orchestrator::{SourceFetcher, ToolchainBuilder};
use goliath::toolchain::patcher::{DEADCODE_GO, LOADER_GO};
use goliath::{BuildError, FetchError, GoliathConfig, LogCollector, LogLevel, Workspace};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const LOADER_SRC: &str = "package loader\n\nfunc NewLoader(flags uint32) *Loader {\n\treturn nil\n}\n";
const DEADCODE_SRC: &str = "package ld\n\nfunc (d *deadcodePass) init() {\n\tfor _, name := range names {\n\t}\n}\n";

/// Creates the workspace and writes the given files instead of downloading.
struct StubFetcher {
    files: Vec<(&'static str, &'static str)>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn with_files(files: &[(&'static str, &'static str)]) -> Self {
        StubFetcher {
            files: files.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SourceFetcher for StubFetcher {
    fn fetch<'a>(
        &'a self,
        version: &'a str,
        config: &'a GoliathConfig,
        _logger: &'a LogCollector,
    ) -> BoxFuture<'a, Result<Workspace, FetchError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let workspace = Workspace::for_version(&config.cwd, version);
            fs::create_dir_all(workspace.tree())?;
            for (rel, content) in &self.files {
                let path = workspace.tree().join(rel);
                fs::create_dir_all(path.parent().unwrap())?;
                fs::write(path, content)?;
            }
            Ok(workspace)
        })
    }
}

/// Records the directory each build would run from.
#[derive(Default)]
struct RecordingBuilder {
    src_dirs: Mutex<Vec<PathBuf>>,
}

impl RecordingBuilder {
    fn calls(&self) -> Vec<PathBuf> {
        self.src_dirs.lock().unwrap().clone()
    }
}

impl ToolchainBuilder for RecordingBuilder {
    fn build<'a>(
        &'a self,
        workspace: &'a Workspace,
        _config: &'a GoliathConfig,
        _logger: &'a LogCollector,
    ) -> BoxFuture<'a, Result<(), BuildError>> {
        Box::pin(async move {
            self.src_dirs.lock().unwrap().push(workspace.src_dir());
            Ok(())
        })
    }
}

fn test_config(cwd: &Path, goroot: &Path) -> GoliathConfig {
    GoliathConfig {
        cwd: cwd.to_path_buf(),
        goroot: Some(goroot.to_path_buf()),
        ..GoliathConfig::default()
    }
}

#[tokio::test]
async fn test_no_arguments_is_a_usage_failure() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let goroot = tempfile::tempdir().expect("Failed to create temp dir");
    let config = GoliathConfig {
        log_dir: Some(cwd.path().join("logs")),
        ..test_config(cwd.path(), goroot.path())
    };
    let fetcher = StubFetcher::with_files(&[]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath"], &config, &fetcher, &builder, &logger).await;

    assert_eq!(code, 1);
    let lines = logger.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, LogLevel::Fatal);
    assert_eq!(lines[0].message, "Syntax: goliath version");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fs::read_dir(cwd.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_goroot_fails_before_fetch() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let config = GoliathConfig {
        cwd: cwd.path().to_path_buf(),
        goroot: None,
        ..GoliathConfig::default()
    };
    let fetcher = StubFetcher::with_files(&[]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath", "1.18.3"], &config, &fetcher, &builder, &logger).await;

    assert_eq!(code, 1);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    let fatal = logger.lines_at(LogLevel::Fatal);
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].message.contains("GOROOT"));
}

#[tokio::test]
async fn test_supported_version_patches_then_builds() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let goroot = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(cwd.path(), goroot.path());
    let fetcher = StubFetcher::with_files(&[(LOADER_GO, LOADER_SRC), (DEADCODE_GO, DEADCODE_SRC)]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath", "1.15.0"], &config, &fetcher, &builder, &logger).await;
    assert_eq!(code, 0);

    let tree = cwd.path().join("go-1.15.0/go");
    let loader = fs::read_to_string(tree.join(LOADER_GO)).unwrap();
    assert_eq!(
        loader,
        "package loader\n\n\
         func (l *Loader) GetSymsByName() [2]map[string]Sym {\n\
         \treturn l.symsByName\n\
         }\n\n\
         func NewLoader(flags uint32) *Loader {\n\treturn nil\n}\n"
    );

    let deadcode = fs::read_to_string(tree.join(DEADCODE_GO)).unwrap();
    let accessor = deadcode.find("GetSymsByName()[1]").unwrap();
    let root_loop = deadcode.find("for _, name := range names {").unwrap();
    assert!(accessor < root_loop);
    assert!(deadcode.contains("\t\tnames = append(names, symName)\n"));

    assert_eq!(builder.calls(), vec![cwd.path().join("go-1.15.0/go/src")]);

    let lines = logger.lines();
    assert!(logger.lines_at(LogLevel::Fatal).is_empty());
    let last = lines.last().unwrap();
    assert_eq!(last.level, LogLevel::Success);
    assert_eq!(last.message, "Done !");
}

#[tokio::test]
async fn test_unsupported_version_stops_before_build() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let goroot = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(cwd.path(), goroot.path());
    let fetcher = StubFetcher::with_files(&[(LOADER_GO, LOADER_SRC), (DEADCODE_GO, DEADCODE_SRC)]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath", "1.14.9"], &config, &fetcher, &builder, &logger).await;

    assert_eq!(code, 1);
    assert!(builder.calls().is_empty());
    let tree = cwd.path().join("go-1.14.9/go");
    assert_eq!(fs::read_to_string(tree.join(LOADER_GO)).unwrap(), LOADER_SRC);
    assert_eq!(fs::read_to_string(tree.join(DEADCODE_GO)).unwrap(), DEADCODE_SRC);

    let fatal = logger.lines_at(LogLevel::Fatal);
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].message.contains("handles versions >= 1.15"));
}

#[tokio::test]
async fn test_upstream_drift_is_not_fatal() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let goroot = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(cwd.path(), goroot.path());
    let renamed_loader = "package loader\n\nfunc CreateLoader() *Loader { return nil }\n";
    let fetcher = StubFetcher::with_files(&[(LOADER_GO, renamed_loader), (DEADCODE_GO, DEADCODE_SRC)]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath", "1.20.4"], &config, &fetcher, &builder, &logger).await;

    assert_eq!(code, 0);
    let tree = cwd.path().join("go-1.20.4/go");
    assert_eq!(fs::read_to_string(tree.join(LOADER_GO)).unwrap(), renamed_loader);
    assert_eq!(logger.lines_at(LogLevel::Warn).len(), 1);
    assert_eq!(builder.calls().len(), 1);
}

#[tokio::test]
async fn test_strict_markers_turn_drift_into_failure() {
    let cwd = tempfile::tempdir().expect("Failed to create temp dir");
    let goroot = tempfile::tempdir().expect("Failed to create temp dir");
    let config = GoliathConfig {
        strict_markers: true,
        ..test_config(cwd.path(), goroot.path())
    };
    let fetcher = StubFetcher::with_files(&[(LOADER_GO, "package loader\n"), (DEADCODE_GO, DEADCODE_SRC)]);
    let builder = RecordingBuilder::default();
    let logger = LogCollector::memory();

    let code = cli::run(["goliath", "1.20.4"], &config, &fetcher, &builder, &logger).await;

    assert_eq!(code, 1);
    assert!(builder.calls().is_empty());
    let fatal = logger.lines_at(LogLevel::Fatal);
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].message.contains("func NewLoader("));
}

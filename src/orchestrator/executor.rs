//! Build execution: runs the toolchain's own `make.bash` and checks its output.
//!
//! The script's stdout and stderr are captured in full (no streaming, no
//! timeout). Success is decided only by the presence of the success marker on
//! stdout; the exit status is recorded but not consulted.

use crate::config::GoliathConfig;
use crate::error::BuildError;
use crate::log_collector::LogCollector;
use crate::models::Workspace;
use crate::orchestrator::ToolchainBuilder;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Captured result of one build script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Resolve `script` against `src_dir` when it is a relative path.
fn script_path(src_dir: &Path, script: &str) -> PathBuf {
    let path = Path::new(script);
    if path.is_relative() && path.components().count() > 1 {
        src_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Run the build script from `src_dir` and wait for it to exit.
pub async fn run_build_script(src_dir: &Path, script: &str) -> Result<BuildOutput, BuildError> {
    let program = script_path(src_dir, script);
    log::debug!("[Build] [EXECUTOR] Running {} in {}", program.display(), src_dir.display());

    let output = Command::new(&program)
        .current_dir(src_dir)
        .output()
        .await
        .map_err(|source| BuildError::Spawn {
            script: script.to_string(),
            dir: src_dir.to_path_buf(),
            source,
        })?;

    Ok(BuildOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Succeeds iff stdout carries `marker`.
pub fn check_build_output(output: &BuildOutput, marker: &str) -> Result<(), BuildError> {
    if output.stdout.contains(marker) {
        return Ok(());
    }
    Err(BuildError::MarkerMissing {
        marker: marker.to_string(),
        stderr: output.stderr.clone(),
    })
}

/// Build stage: compile the patched tree in place.
pub async fn build_toolchain(
    workspace: &Workspace,
    config: &GoliathConfig,
    logger: &LogCollector,
) -> Result<BuildOutput, BuildError> {
    logger.info("Building Go...");
    let output = run_build_script(&workspace.src_dir(), &config.build_script).await?;
    log::debug!("[Build] {} exited with status {:?}", config.build_script, output.status);
    check_build_output(&output, &config.success_marker)?;
    Ok(output)
}

/// Production builder invoking `make.bash`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeBashBuilder;

impl ToolchainBuilder for MakeBashBuilder {
    fn build<'a>(
        &'a self,
        workspace: &'a Workspace,
        config: &'a GoliathConfig,
        logger: &'a LogCollector,
    ) -> BoxFuture<'a, Result<(), BuildError>> {
        Box::pin(async move {
            build_toolchain(workspace, config, logger).await?;
            Ok(())
        })
    }
}

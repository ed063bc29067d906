//! Command line front end: `goliath <version>`.
//!
//! Every failure, whether a usage mistake or a network/IO fault, is reported
//! as a single fatal log line and mapped to exit status 1.

use crate::config::GoliathConfig;
use crate::error::{BuildError, GoliathError, Result};
use crate::log_collector::LogCollector;
use crate::orchestrator::{Pipeline, PipelineSummary, SourceFetcher, ToolchainBuilder};
use clap::Parser;
use std::ffi::OsString;

pub const USAGE: &str = "Syntax: goliath version";

/// Goliath takes a single positional argument and no flags.
#[derive(Parser, Debug)]
#[command(name = "goliath", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Go release to build, e.g. 1.18.3
    pub version: Option<String>,
}

/// Extract the requested version from the raw argument list.
pub fn parse_version<I, T>(args: I) -> Result<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|_| GoliathError::Usage(USAGE.to_string()))?;
    cli.version
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GoliathError::Usage(USAGE.to_string()))
}

/// Log `err` the same way for every failure kind.
///
/// A failed build additionally gets its captured stderr logged verbatim.
pub fn report_failure(logger: &LogCollector, err: &GoliathError) {
    logger.fatal(err.to_string());
    if let GoliathError::Build(BuildError::MarkerMissing { stderr, .. }) = err {
        if !stderr.is_empty() {
            logger.fatal(stderr.clone());
        }
    }
}

async fn run_pipeline<I, T, F, B>(
    args: I,
    config: &GoliathConfig,
    fetcher: &F,
    builder: &B,
    logger: &LogCollector,
) -> Result<PipelineSummary>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: SourceFetcher,
    B: ToolchainBuilder,
{
    let version = parse_version(args)?;
    if let Some(dir) = &config.log_dir {
        match logger.attach_log_dir(dir) {
            Ok(path) => log::debug!("[CLI] Session log at {}", path.display()),
            Err(e) => logger.warn(e),
        }
    }
    config.validate_host_environment()?;
    Pipeline::new(fetcher, builder, config, logger)
        .run(&version)
        .await
}

/// Parse `args`, check the host, run the pipeline. Returns the exit status.
///
/// The session log file, if configured, is opened only once a version was given.
pub async fn run<I, T, F, B>(
    args: I,
    config: &GoliathConfig,
    fetcher: &F,
    builder: &B,
    logger: &LogCollector,
) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: SourceFetcher,
    B: ToolchainBuilder,
{
    match run_pipeline(args, config, fetcher, builder, logger).await {
        Ok(summary) => {
            log::debug!(
                "[CLI] {} patch(es) applied, {} drifted, tree at {}",
                summary.patches.applied(),
                summary.patches.drifted().count(),
                summary.workspace.tree().display()
            );
            logger.success("Done !");
            0
        }
        Err(err) => {
            report_failure(logger, &err);
            err.exit_code()
        }
    }
}

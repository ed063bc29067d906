//! Build Orchestration: 3-stage toolchain pipeline (Fetching -> Patching -> Building).
//!
//! Stages run strictly in sequence and share state only through the
//! workspace on disk. The first failing stage aborts the run; nothing is
//! retried or rolled back.

pub mod executor;

use crate::config::GoliathConfig;
use crate::error::{BuildError, FetchError, Result};
use crate::log_collector::LogCollector;
use crate::models::{BuildPhase, PatchReport, Workspace};
use crate::toolchain::patcher::patch_toolchain;
use futures::future::BoxFuture;

pub use executor::MakeBashBuilder;

/// Produces an extracted source tree for a version.
pub trait SourceFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        version: &'a str,
        config: &'a GoliathConfig,
        logger: &'a LogCollector,
    ) -> BoxFuture<'a, std::result::Result<Workspace, FetchError>>;
}

/// Compiles a patched source tree.
pub trait ToolchainBuilder: Send + Sync {
    fn build<'a>(
        &'a self,
        workspace: &'a Workspace,
        config: &'a GoliathConfig,
        logger: &'a LogCollector,
    ) -> BoxFuture<'a, std::result::Result<(), BuildError>>;
}

/// What a successful run left behind.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub workspace: Workspace,
    pub patches: PatchReport,
}

/// Sequences fetch, patch and build for one version.
pub struct Pipeline<'a, F, B> {
    fetcher: &'a F,
    builder: &'a B,
    config: &'a GoliathConfig,
    logger: &'a LogCollector,
}

impl<'a, F, B> Pipeline<'a, F, B>
where
    F: SourceFetcher,
    B: ToolchainBuilder,
{
    pub fn new(
        fetcher: &'a F,
        builder: &'a B,
        config: &'a GoliathConfig,
        logger: &'a LogCollector,
    ) -> Self {
        Pipeline {
            fetcher,
            builder,
            config,
            logger,
        }
    }

    /// Run every stage for `version`, stopping at the first failure.
    pub async fn run(&self, version: &str) -> Result<PipelineSummary> {
        log::debug!("[Pipeline] {} stage for {}", BuildPhase::Fetching, version);
        let workspace = self.fetcher.fetch(version, self.config, self.logger).await?;

        log::debug!("[Pipeline] {} stage in {}", BuildPhase::Patching, workspace.tree().display());
        let patches = patch_toolchain(&workspace, version, self.config, self.logger)?;

        log::debug!("[Pipeline] {} stage in {}", BuildPhase::Building, workspace.src_dir().display());
        self.builder.build(&workspace, self.config, self.logger).await?;

        Ok(PipelineSummary { workspace, patches })
    }
}

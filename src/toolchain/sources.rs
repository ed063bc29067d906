//! Go source distribution download and extraction.
//!
//! The archive for a release lives at `<dist_base_url>/go<version>.src.tar.gz`
//! and unpacks to a single top-level `go/` directory.

use crate::config::GoliathConfig;
use crate::error::FetchError;
use crate::log_collector::LogCollector;
use crate::models::Workspace;
use crate::orchestrator::SourceFetcher;
use flate2::read::GzDecoder;
use futures::future::BoxFuture;
use std::fs::{self, File};
use std::path::Path;

/// Fetch one archive body. Any non-2xx status is an error.
pub async fn download_archive(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    log::debug!("[Fetch] GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    log::debug!("[Fetch] Received {} bytes", body.len());
    Ok(body.to_vec())
}

/// Unpack a gzip'd tarball into `dest`.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<(), FetchError> {
    let extract_err = |source| FetchError::Extract {
        archive: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(extract_err)?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    tarball.unpack(dest).map_err(extract_err)?;
    Ok(())
}

/// Download and unpack the sources of `version` into its workspace.
///
/// Creates `<cwd>/go-<version>/` if needed, writes `go.tar.gz` there, extracts
/// it in place and deletes the archive. Nothing is cleaned up on failure.
pub async fn fetch_sources(
    client: &reqwest::Client,
    config: &GoliathConfig,
    version: &str,
    logger: &LogCollector,
) -> Result<Workspace, FetchError> {
    let workspace = Workspace::for_version(&config.cwd, version);

    logger.info(format!("Downloading Go v{}...", version));
    let body = download_archive(client, &config.archive_url(version)).await?;

    fs::create_dir_all(workspace.root())?;
    let archive = workspace.archive_path();
    fs::write(&archive, &body)?;

    logger.info(format!("Extracting Go v{}...", version));
    extract_archive(&archive, workspace.root())?;
    fs::remove_file(&archive)?;

    Ok(workspace)
}

/// Production fetcher talking to the distribution host over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SourceFetcher for HttpSourceFetcher {
    fn fetch<'a>(
        &'a self,
        version: &'a str,
        config: &'a GoliathConfig,
        logger: &'a LogCollector,
    ) -> BoxFuture<'a, Result<Workspace, FetchError>> {
        Box::pin(fetch_sources(&self.client, config, version, logger))
    }
}

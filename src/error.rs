//! Unified error type hierarchy for Goliath
//!
//! Provides structured error handling with FetchError, PatchError, BuildError,
//! ConfigError, and the top-level GoliathError consumed by the driver.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Source archive download and extraction errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Download of {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Distribution host answered {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to extract {archive}: {source}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error while fetching sources: {0}")]
    IoError(#[from] io::Error),
}

/// Toolchain source patching errors.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("Goliath currently handles versions >= 1.{min_minor} (got {version})")]
    UnsupportedVersion { version: String, min_minor: u32 },

    #[error("Malformed Go version '{0}': expected <major>.<minor>[.<patch>]")]
    MalformedVersion(String),

    #[error("Marker '{marker}' not found in {file} (patch '{patch}')")]
    MarkerNotFound {
        patch: String,
        file: PathBuf,
        marker: String,
    },

    #[error("Failed to rewrite {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Toolchain build execution errors.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to launch build script {script} in {dir}: {source}")]
    Spawn {
        script: String,
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Build failed: output did not contain '{marker}'")]
    MarkerMissing { marker: String, stderr: String },
}

/// Configuration and host-environment errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("GOROOT is not set; point it at an existing Go installation")]
    GorootMissing,

    #[error("GOROOT points to '{0}', which is not an existing directory")]
    GorootInvalid(PathBuf),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Global error type for the pipeline.
///
/// Every variant is a fatal condition: the driver logs it once and exits 1.
#[derive(Error, Debug)]
pub enum GoliathError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl GoliathError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Top-level result type for pipeline operations.
pub type Result<T> = std::result::Result<T, GoliathError>;

//! Configuration for a Goliath run.
//!
//! # Resolution order
//!
//! 1. Built-in defaults (`GoliathConfig::default`)
//! 2. Optional settings file at `~/.config/goliath/settings.json`
//! 3. Environment overrides (`GOLIATH_DIST_URL`, `GOLIATH_STRICT_MARKERS`,
//!    `GOLIATH_LOG_DIR`) plus the host's `GOROOT`
//!
//! The resolved value is built once in `main` and passed to every stage.

pub mod loader;

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// Official Go distribution host.
pub const DEFAULT_DIST_BASE_URL: &str = "https://go.dev/dl";

/// Entry point of the Go bootstrap build, relative to `go/src`.
pub const DEFAULT_BUILD_SCRIPT: &str = "./make.bash";

/// Printed by `make.bash` once the toolchain is installed.
pub const DEFAULT_SUCCESS_MARKER: &str = "Installed Go for";

/// Settings for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoliathConfig {
    /// Base URL the `go<version>.src.tar.gz` archive is fetched from.
    pub dist_base_url: String,
    pub build_script: String,
    pub success_marker: String,
    /// Fail the patch stage when a marker line is missing instead of warning.
    pub strict_markers: bool,
    /// Directory receiving a persisted copy of the console log.
    pub log_dir: Option<PathBuf>,

    /// Directory the `go-<version>` workspace is created in.
    #[serde(skip)]
    pub cwd: PathBuf,
    /// Host Go installation; checked for presence only.
    #[serde(skip)]
    pub goroot: Option<PathBuf>,
}

impl Default for GoliathConfig {
    fn default() -> Self {
        GoliathConfig {
            dist_base_url: DEFAULT_DIST_BASE_URL.to_string(),
            build_script: DEFAULT_BUILD_SCRIPT.to_string(),
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            strict_markers: false,
            log_dir: None,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            goroot: None,
        }
    }
}

impl GoliathConfig {
    /// Resolve the configuration of the running process.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match loader::get_global_settings_path() {
            Some(path) if path.exists() => loader::load_settings_file(&path)?,
            _ => GoliathConfig::default(),
        };
        loader::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config.cwd = std::env::current_dir()?;
        Ok(config)
    }

    /// Archive URL for `version`.
    pub fn archive_url(&self, version: &str) -> String {
        format!(
            "{}/go{}.src.tar.gz",
            self.dist_base_url.trim_end_matches('/'),
            version
        )
    }

    /// `GOROOT` must name an existing Go installation on the host.
    pub fn validate_host_environment(&self) -> Result<(), ConfigError> {
        let goroot = self.goroot.as_ref().ok_or(ConfigError::GorootMissing)?;
        if !goroot.is_dir() {
            return Err(ConfigError::GorootInvalid(goroot.clone()));
        }
        Ok(())
    }
}

//! Settings file loader and environment overrides.

use crate::config::GoliathConfig;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the global settings path: ~/.config/goliath/settings.json
pub fn get_global_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/goliath/settings.json"))
}

/// Load settings from a JSON file. Missing keys keep their defaults.
pub fn load_settings_file(path: &Path) -> Result<GoliathConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(format!(
                "Settings file not found at: {}",
                path.display()
            ))
        } else {
            ConfigError::IoError(e)
        }
    })?;

    let config: GoliathConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Apply environment overrides read through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut GoliathConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("GOLIATH_DIST_URL") {
        config.dist_base_url = url;
    }
    if let Some(strict) = var("GOLIATH_STRICT_MARKERS") {
        config.strict_markers = parse_flag(&strict);
    }
    if let Some(dir) = var("GOLIATH_LOG_DIR") {
        config.log_dir = Some(PathBuf::from(dir));
    }
    config.goroot = var("GOROOT").map(PathBuf::from);
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

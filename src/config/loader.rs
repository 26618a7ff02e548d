use super::{ConfigError, DaemonConfig};
use crate::utils::membership_home;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Resolve the canonical path for the config file.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    membership_home().map(|h| h.join("config.toml"))
}

/// Load the daemon configuration from `~/.membership/config.toml`.
///
/// Returns `Ok(DaemonConfig::default())` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_config() -> Result<DaemonConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine config directory; using defaults");
        return Ok(DaemonConfig::default());
    };
    load_config_from(&path)
}

/// Load the configuration from an explicit path.
///
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<DaemonConfig, ConfigError> {
    if !path.exists() {
        debug!("Config not found at {}; using defaults", path.display());
        return Ok(DaemonConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: DaemonConfig = toml::from_str(&content)?;
    config.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

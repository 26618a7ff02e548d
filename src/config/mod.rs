//! Daemon configuration loaded from `~/.membership/config.toml`.
//!
//! The file is optional; every section and field falls back to its `Default`
//! value when absent.

mod loader;

pub use loader::{config_path, load_config, load_config_from};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path of the JSON state file. Defaults to `<home>/state.json`.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn default_max_emails() -> usize {
    50
}

fn default_conflict_retries() -> u32 {
    3
}

/// `[invitation]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InvitationConfig {
    /// Upper bound on addresses accepted by a single invitation call
    #[serde(default = "default_max_emails")]
    pub max_emails_per_request: usize,
    /// How many times a create that hit the unique constraint is retried
    /// through the "row exists" branch before giving up
    #[serde(default = "default_conflict_retries")]
    pub conflict_retries: u32,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            max_emails_per_request: default_max_emails(),
            conflict_retries: default_conflict_retries(),
        }
    }
}

fn default_retention_days() -> u32 {
    90
}

fn default_page_size() -> u32 {
    20
}

/// `[rubbish]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RubbishConfig {
    /// Nodes deleted longer ago than this are "over limit" and hidden unless
    /// explicitly requested
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Page size used when a list request does not carry one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for RubbishConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            default_page_size: default_page_size(),
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub invitation: InvitationConfig,
    #[serde(default)]
    pub rubbish: RubbishConfig,
}

/// Smallest page a rubbish listing may request
pub const MIN_PAGE_SIZE: u32 = 5;
/// Largest page a rubbish listing may request
pub const MAX_PAGE_SIZE: u32 = 100;
/// Longest retention window accepted, in days (about a century)
pub const MAX_RETENTION_DAYS: u32 = 36_500;

impl DaemonConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.invitation.max_emails_per_request == 0 {
            return Err(ConfigError::Invalid {
                field: "invitation.max_emails_per_request",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_RETENTION_DAYS).contains(&self.rubbish.retention_days) {
            return Err(ConfigError::Invalid {
                field: "rubbish.retention_days",
                reason: format!("must be between 1 and {MAX_RETENTION_DAYS}"),
            });
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.rubbish.default_page_size) {
            return Err(ConfigError::Invalid {
                field: "rubbish.default_page_size",
                reason: format!("must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"),
            });
        }
        Ok(())
    }

    /// The state file to open: the configured one, else the default location.
    #[must_use]
    pub fn data_file(&self) -> PathBuf {
        self.storage
            .data_file
            .clone()
            .unwrap_or_else(crate::utils::default_state_path)
    }
}

#[cfg(test)]
#[path = "../config_tests.rs"]
mod config_tests;

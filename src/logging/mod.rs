mod init;

pub use init::{init_logging, parse_rotation};

use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_appender::rolling::Rotation;

/// Log filename used by the daemon.
pub const LOG_FILENAME: &str = "membership-daemon.log";

/// Crate target used for the default `EnvFilter` directive.
pub const LOG_TARGET: &str = "membership_daemon";

/// Global log file path, set once at startup.
static LOG_FILE_PATH: OnceLock<String> = OnceLock::new();

/// Store the log file path for structured error responses.
pub fn set_log_file_path(path: String) {
    let _ = LOG_FILE_PATH.set(path);
}

/// Get the log file path set at startup (empty before startup).
pub fn get_log_file_path() -> &'static str {
    LOG_FILE_PATH.get().map_or("", String::as_str)
}

/// Configuration for the logging system.
pub struct LogConfig {
    /// Directory where log files will be written.
    pub log_dir: PathBuf,
    /// Default log level when `RUST_LOG` is not set.
    pub log_level: Level,
    /// Whether to use JSON format for logs.
    pub json_format: bool,
    /// Log rotation period.
    pub rotation: Rotation,
}

/// Default log directory (`<home>/logs`).
#[must_use]
pub fn default_log_dir() -> PathBuf {
    crate::utils::membership_home()
        .unwrap_or_else(|| PathBuf::from(crate::utils::HOME_FOLDER))
        .join("logs")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_level: Level::INFO,
            json_format: false,
            rotation: Rotation::DAILY,
        }
    }
}

#[cfg(test)]
#[path = "../logging_tests.rs"]
mod logging_tests;

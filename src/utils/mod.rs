mod atomic;

pub use atomic::atomic_write;

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// The name of the per-user daemon folder
pub const HOME_FOLDER: &str = ".membership";

/// Environment variable that overrides the daemon home directory
pub const HOME_ENV: &str = "MEMBERSHIP_HOME";

/// The name of the default state file inside the daemon home
pub const STATE_FILE: &str = "state.json";

/// Current daemon version
pub const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve the daemon home directory.
///
/// If `MEMBERSHIP_HOME` is set, that directory is used instead of
/// `~/.membership`, so tests and CI never touch real user data.
#[must_use]
pub fn membership_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }
    dirs::home_dir().map(|h| h.join(HOME_FOLDER))
}

/// Default location of the state file (`~/.membership/state.json`)
#[must_use]
pub fn default_state_path() -> PathBuf {
    membership_home()
        .unwrap_or_else(|| PathBuf::from(HOME_FOLDER))
        .join(STATE_FILE)
}

/// Current UTC timestamp
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Generate a new opaque identifier
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Returns true when the string is empty or whitespace only
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
#[path = "../utils_tests.rs"]
mod utils_tests;

//! Atomic file write operations.
//!
//! Temp files are created next to the target and renamed into place, so a
//! reader never observes a half-written state file.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write content to a file atomically using a temporary file.
///
/// The parent directory is created when missing. The temp file is removed
/// automatically if any step fails.
///
/// # Errors
///
/// Returns an `io::Error` if the path has no parent, the directory or temp
/// file cannot be created, or the final rename fails.
pub async fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory"))?
        .to_path_buf();
    let target_path = path.to_path_buf();
    let content_owned = content.to_string();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        use std::io::Write;

        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(&parent)?;
        }
        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content_owned.as_bytes())?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;

        // persist() consumes the temp file, so it is not removed on drop
        temp_file.persist(&target_path).map_err(|e| e.error)?;

        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

//! Staging uploaded bytes on disk so the orchestrator has a path to work on.
//!
//! A browser upload or stdin stream arrives as bytes plus a client-supplied
//! name. [`stage_upload`] writes them into a fresh [`TempDir`] owned by the
//! returned [`StagedUpload`]; the directory, the upload, and any `.md`
//! produced next to it are removed when the value is dropped, even on panic.

use crate::error::MurkdownError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// An upload written to its own temporary directory.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl StagedUpload {
    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `bytes` to `dir/<name>`, creating `dir` if needed.
///
/// Only the final component of `name` is used, so a client-supplied
/// `../../etc/passwd` lands as `dir/passwd`.
pub fn save_upload(dir: impl AsRef<Path>, name: &str, bytes: &[u8]) -> Result<PathBuf, MurkdownError> {
    let dir = dir.as_ref();
    let upload_failed = |source: std::io::Error| MurkdownError::UploadFailed {
        name: name.to_string(),
        source,
    };

    let file_name = Path::new(name)
        .file_name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            upload_failed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "upload name has no file name component",
            ))
        })?;

    std::fs::create_dir_all(dir).map_err(upload_failed)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(upload_failed)?;

    debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Write `bytes` into a new temporary directory as `name`.
pub fn stage_upload(name: &str, bytes: &[u8]) -> Result<StagedUpload, MurkdownError> {
    let temp_dir = tempfile::Builder::new()
        .prefix("murkdown-upload-")
        .tempdir()
        .map_err(|source| MurkdownError::UploadFailed {
            name: name.to_string(),
            source,
        })?;
    let path = save_upload(temp_dir.path(), name, bytes)?;
    Ok(StagedUpload {
        path,
        _temp_dir: temp_dir,
    })
}

/// Delete every regular file directly inside `dir`.
///
/// Subdirectories are left alone. Failures are logged and skipped. Returns
/// how many files were removed; a missing `dir` removes nothing.
pub fn cleanup_temp_files(dir: impl AsRef<Path>) -> usize {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Error deleting {}: {}", path.display(), e),
        }
    }
    debug!("Removed {} temp files from {}", removed, dir.display());
    removed
}

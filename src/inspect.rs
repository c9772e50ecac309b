//! File metadata without conversion.
//!
//! Used by the presentation layer to show name, size, and type of an upload
//! before the user commits to converting it. Needs no converter backend.

use crate::error::{MurkdownError, ValidationError};
use crate::formats::{self, FALLBACK_MIME_TYPE};
use crate::output::FileMetadata;
use std::path::Path;
use tracing::debug;

/// MIME type for `path` from its extension, or `application/octet-stream`.
pub fn detect_mime_type(path: impl AsRef<Path>) -> &'static str {
    formats::raw_extension(path.as_ref())
        .and_then(|ext| formats::mime_for_extension(&ext))
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Gather [`FileMetadata`] for an existing file.
///
/// # Errors
/// [`ValidationError::FileNotFound`] when `path` is not an existing regular file.
pub fn inspect(path: impl AsRef<Path>) -> Result<FileMetadata, MurkdownError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .ok_or_else(|| ValidationError::FileNotFound {
            path: path.to_path_buf(),
        })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!("Inspected {}: {} bytes", path.display(), metadata.len());

    Ok(FileMetadata {
        filename,
        size: metadata.len(),
        mime_type: detect_mime_type(path).to_string(),
    })
}

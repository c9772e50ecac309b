//! The supported-format registry: lower-case extension → canonical MIME type.
//!
//! The table is fixed at compile time and built once on first use. It drives
//! both the format check in [`crate::ConversionOrchestrator::validate`] and
//! MIME detection in [`crate::inspect::detect_mime_type`].

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::path::Path;

/// MIME type reported for files whose extension is not in the registry.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

static SUPPORTED_FORMATS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("pdf", "application/pdf"),
        (
            "docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        (
            "pptx",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ),
        (
            "xlsx",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
        ("txt", "text/plain"),
        ("html", "text/html"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("mp3", "audio/mpeg"),
        ("wav", "audio/wav"),
    ])
});

/// Read-only view of the registry, sorted by extension.
pub fn supported_formats() -> &'static BTreeMap<&'static str, &'static str> {
    &SUPPORTED_FORMATS
}

/// Look up the MIME type for an extension (without the dot), ignoring case.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    SUPPORTED_FORMATS
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}

/// The raw extension of `path` as given, `None` when it has none.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn raw_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}

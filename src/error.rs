//! Error types for the murkdown library.
//!
//! Two layers mirror the two places a conversion can be refused:
//!
//! * [`ValidationError`] — the pre-flight checks rejected the input file
//!   (missing, too large, unsupported extension). The converter backend is
//!   never invoked for these.
//!
//! * [`MurkdownError`] — everything else the library can report: a converter
//!   backend failure, a failed `.md` write, bad configuration, upload staging
//!   problems.
//!
//! [`crate::ConversionOrchestrator::convert`] never returns either of these
//! as `Err`; it folds them into a failed [`crate::output::ConversionResult`].
//! The other entry points (`inspect`, `save_upload`, the config builder)
//! return them directly.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A pre-flight check failed.
///
/// The `Display` output is the exact message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The path does not name an existing regular file.
    #[error("File '{}' does not exist", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file is larger than the configured limit.
    #[error("File size exceeds {limit} limit")]
    FileTooLarge { size: u64, limit: SizeLimit },

    /// The extension is missing or not in the format registry.
    ///
    /// `extension` is the raw extension as given (original case), empty when
    /// the file has none.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },
}

/// All errors returned by the murkdown library.
#[derive(Debug, Error)]
pub enum MurkdownError {
    // ── Input errors ──────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ── Backend errors ────────────────────────────────────────────────────
    /// The converter backend failed. The message is the backend's own error
    /// text, kept verbatim.
    #[error("{message}")]
    Conversion { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the output Markdown file.
    #[error("Failed to write output file '{}': {}", .path.display(), .source)]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not stage uploaded bytes on disk.
    #[error("Failed to save uploaded file '{name}': {source}")]
    UploadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const KIB: u64 = 1024;
pub(crate) const MIB: u64 = 1024 * KIB;

/// A byte limit with its unit: `100MB` for whole MiB, `1.5MB` down to a
/// tenth of a MiB, then `64KB` for whole KiB and plain bytes (`8B`) below that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit(pub u64);

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes >= MIB && bytes % MIB == 0 {
            write!(f, "{}MB", bytes / MIB)
        } else if bytes >= MIB / 10 {
            write!(f, "{:.1}MB", bytes as f64 / MIB as f64)
        } else if bytes >= KIB && bytes % KIB == 0 {
            write!(f, "{}KB", bytes / KIB)
        } else {
            write!(f, "{bytes}B")
        }
    }
}

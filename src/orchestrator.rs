//! Gatekeeping and coordination for a single file-to-Markdown conversion.
//!
//! ```text
//! path
//!  │
//!  ├─ 1. Validate  exists → size ≤ limit → extension in registry
//!  ├─ 2. Convert   DocumentConverter::convert_local
//!  ├─ 3. Persist   <same dir>/<same stem>.md, written atomically
//!  └─ 4. Result    ConversionResult (never an Err)
//! ```
//!
//! The checks in step 1 short-circuit in that fixed order so the reported
//! reason is deterministic and the cheapest check runs first.

use crate::config::OrchestratorConfig;
use crate::converter::DocumentConverter;
use crate::error::{MurkdownError, SizeLimit, ValidationError};
use crate::formats;
use crate::output::{ConversionResult, ValidationOutcome};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Validates inputs and delegates conversion to a [`DocumentConverter`].
///
/// Holds no mutable state, so one instance can be shared across threads
/// (wrap it in an `Arc`) as long as the converter tolerates concurrent calls.
#[derive(Clone)]
pub struct ConversionOrchestrator {
    converter: Arc<dyn DocumentConverter>,
    config: OrchestratorConfig,
}

impl fmt::Debug for ConversionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOrchestrator")
            .field("converter", &"<dyn DocumentConverter>")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionOrchestrator {
    /// Orchestrator with the default 100 MiB size limit.
    pub fn new(converter: Arc<dyn DocumentConverter>) -> Self {
        Self::with_config(converter, OrchestratorConfig::default())
    }

    pub fn with_config(converter: Arc<dyn DocumentConverter>, config: OrchestratorConfig) -> Self {
        Self { converter, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Read-only view of the extension → MIME type registry.
    pub fn supported_formats(&self) -> &'static BTreeMap<&'static str, &'static str> {
        formats::supported_formats()
    }

    /// Run the pre-flight checks on `path` without converting it.
    pub fn validate(&self, path: impl AsRef<Path>) -> ValidationOutcome {
        self.check(path.as_ref()).into()
    }

    /// Same checks as [`Self::validate`], as a typed error.
    pub fn check(&self, path: &Path) -> Result<(), ValidationError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            _ => {
                return Err(ValidationError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
        };

        if metadata.len() > self.config.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: metadata.len(),
                limit: SizeLimit(self.config.max_file_size),
            });
        }

        match formats::raw_extension(path) {
            Some(ext) if formats::mime_for_extension(&ext).is_some() => Ok(()),
            ext => Err(ValidationError::UnsupportedFormat {
                extension: ext.unwrap_or_default(),
            }),
        }
    }

    /// Validate, convert, and persist `path` as a sibling `.md` file.
    ///
    /// Never fails: every error ends up in the returned [`ConversionResult`].
    /// The converter is not called when validation fails, and nothing is
    /// written unless the converter succeeded.
    pub fn convert(&self, path: impl AsRef<Path>) -> ConversionResult {
        let path = path.as_ref();
        info!("Starting conversion: {}", path.display());

        match self.try_convert(path) {
            Ok(result) => result,
            Err(e) => {
                warn!("Conversion of {} failed: {}", path.display(), e);
                ConversionResult::failure(path, &e)
            }
        }
    }

    fn try_convert(&self, path: &Path) -> Result<ConversionResult, MurkdownError> {
        self.check(path)?;

        let doc = self
            .converter
            .convert_local(path)
            .map_err(|e| MurkdownError::Conversion {
                message: e.to_string(),
            })?;
        debug!(
            "Converter returned {} bytes for {}",
            doc.text_content.len(),
            path.display()
        );

        let output_file = output_path(path);
        write_atomic(&output_file, &doc.text_content)?;
        info!("Wrote {}", output_file.display());

        Ok(ConversionResult::success(
            path,
            doc.text_content,
            doc.title,
            output_file,
        ))
    }
}

/// `dir/name.ext` → `dir/name.md`.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("md")
}

/// Write to a temp file in the target directory, then rename over `path`,
/// so a failed write never leaves a truncated `.md` behind.
fn write_atomic(path: &Path, content: &str) -> Result<(), MurkdownError> {
    let write_failed = |source: std::io::Error| MurkdownError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".murkdown-").suffix(".md.tmp");
    // Same mode `fs::write` would give a new file (0666 less the umask),
    // not tempfile's owner-only 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_failed)?;
    tmp.write_all(content.as_bytes()).map_err(write_failed)?;

    // The rename replaces the inode, so carry an existing output's mode over.
    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_file() {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(write_failed)?;
        }
    }
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}

//! Values handed back to the presentation layer.
//!
//! [`ConversionResult`] is the one value `convert` ever produces: exactly one
//! of success-with-content or failure-with-error, enforced by
//! [`ConversionOutcome`] being an enum rather than a bag of optional fields.

use crate::error::{MurkdownError, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which stage refused or failed a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing, oversized, or unsupported input. The converter never ran.
    Validation,
    /// The converter backend returned an error.
    Conversion,
    /// Conversion succeeded but the `.md` output could not be written.
    Persist,
}

/// The tagged outcome of a conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Success {
        /// Extracted Markdown text. May be empty.
        content: String,
        /// Document title, when the backend found one.
        title: Option<String>,
        /// Where `content` was written.
        output_file: PathBuf,
    },
    Failure {
        /// Human-readable error, shown to the user verbatim.
        error: String,
        kind: FailureKind,
    },
}

/// Result of one [`crate::ConversionOrchestrator::convert`] call.
///
/// Immutable after construction; the caller owns it for display or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The input path exactly as passed to `convert`.
    pub original_file: PathBuf,
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
}

impl ConversionResult {
    pub(crate) fn success(
        original_file: &Path,
        content: String,
        title: Option<String>,
        output_file: PathBuf,
    ) -> Self {
        Self {
            original_file: original_file.to_path_buf(),
            outcome: ConversionOutcome::Success {
                content,
                title,
                output_file,
            },
        }
    }

    pub(crate) fn failure(original_file: &Path, error: &MurkdownError) -> Self {
        let kind = match error {
            MurkdownError::Validation(_) => FailureKind::Validation,
            MurkdownError::OutputWriteFailed { .. } => FailureKind::Persist,
            _ => FailureKind::Conversion,
        };
        Self {
            original_file: original_file.to_path_buf(),
            outcome: ConversionOutcome::Failure {
                error: error.to_string(),
                kind,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ConversionOutcome::Success { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            ConversionOutcome::Success { content, .. } => Some(content),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.outcome {
            ConversionOutcome::Success { title, .. } => title.as_deref(),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    pub fn output_file(&self) -> Option<&Path> {
        match &self.outcome {
            ConversionOutcome::Success { output_file, .. } => Some(output_file),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ConversionOutcome::Success { .. } => None,
            ConversionOutcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            ConversionOutcome::Success { .. } => None,
            ConversionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The first `max_chars` characters of the content, with `...` appended
    /// when anything was cut. `None` for failed conversions.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        let content = self.content()?;
        match content.char_indices().nth(max_chars) {
            Some((cut, _)) => Some(format!("{}...", &content[..cut])),
            None => Some(content.to_string()),
        }
    }
}

/// Outcome of [`crate::ConversionOrchestrator::validate`].
///
/// `reason` is present if and only if the input was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    reason: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self { reason: None }
    }

    pub fn is_valid(&self) -> bool {
        self.reason.is_none()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The `(is_valid, reason)` pair.
    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.reason.is_none(), self.reason)
    }
}

impl From<Result<(), ValidationError>> for ValidationOutcome {
    fn from(result: Result<(), ValidationError>) -> Self {
        Self {
            reason: result.err().map(|e| e.to_string()),
        }
    }
}

/// Basic facts about a file, gathered without converting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    pub mime_type: String,
}

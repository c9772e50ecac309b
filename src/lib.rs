//! # murkdown
//!
//! Validate uploaded documents and turn them into Markdown through a
//! pluggable converter backend.
//!
//! The crate does not parse PDF, DOCX, spreadsheets, images, or audio
//! itself. That work belongs to a [`DocumentConverter`] (by default the
//! external `markitdown` tool). What lives here is the contract around it:
//! pre-flight checks, error capture, and persisting the result.
//!
//! ## Flow
//!
//! ```text
//! upload bytes ──▶ stage_upload ──▶ ConversionOrchestrator::convert ──▶ ConversionResult
//!                                    │
//!                                    ├─ validate  exists / size / extension
//!                                    ├─ convert   DocumentConverter (external)
//!                                    └─ persist   sibling .md file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use murkdown::{ConversionOrchestrator, MarkItDownCommand};
//! use std::sync::Arc;
//!
//! let orchestrator = ConversionOrchestrator::new(Arc::new(MarkItDownCommand::default()));
//! let result = orchestrator.convert("report.pdf");
//! match result.error() {
//!     None => println!("{}", result.content().unwrap_or_default()),
//!     Some(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `murkdown` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod converter;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod session;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::convert_batch;
pub use config::{OrchestratorConfig, OrchestratorConfigBuilder, DEFAULT_MAX_FILE_SIZE};
pub use converter::{
    ConvertedDocument, ConverterError, DocumentConverter, MarkItDownCommand, PlainTextConverter,
};
pub use error::{MurkdownError, SizeLimit, ValidationError};
pub use formats::{mime_for_extension, supported_formats};
pub use inspect::{detect_mime_type, inspect};
pub use orchestrator::{output_path, ConversionOrchestrator};
pub use output::{ConversionOutcome, ConversionResult, FailureKind, FileMetadata, ValidationOutcome};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::SessionView;
pub use upload::{cleanup_temp_files, save_upload, stage_upload, StagedUpload};

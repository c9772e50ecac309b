//! Progress-callback trait for multi-file conversion events.
//!
//! Pass an [`Arc<dyn BatchProgressCallback>`] to
//! [`crate::batch::convert_batch`] to hear about each file as it finishes.
//! The CLI drives its progress bar from this; a web front end could forward
//! the same events over a socket.
//!
//! # Example
//!
//! ```rust
//! use murkdown::{BatchProgressCallback, ConversionResult};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _index: usize, total: usize, result: &ConversionResult) {
//!         let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total}: {} ok={}", result.original_file.display(), result.is_success());
//!     }
//! }
//! ```

use crate::output::ConversionResult;
use std::sync::Arc;

/// Called by [`crate::batch::convert_batch`] as files are processed.
///
/// Files are converted concurrently, so `on_file_start` and
/// `on_file_complete` may be called from several threads at once and in any
/// order. All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any file is converted.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a file is handed to the orchestrator.
    ///
    /// * `index` — 0-based position of the file in the input list
    fn on_file_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a file's [`ConversionResult`] is ready, success or not.
    fn on_file_complete(&self, index: usize, total: usize, result: &ConversionResult) {
        let _ = (index, total, result);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias for the callback type taken by `convert_batch`.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

//! Converting several files at once.
//!
//! [`crate::ConversionOrchestrator::convert`] is synchronous and may block
//! for a long time inside the converter backend, so each call runs on
//! tokio's blocking pool. `concurrency` bounds how many run at once; results
//! come back in input order regardless of completion order.

use crate::error::MurkdownError;
use crate::orchestrator::ConversionOrchestrator;
use crate::output::ConversionResult;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Convert every path in `paths`, at most `concurrency` at a time.
///
/// Never fails: each file gets a [`ConversionResult`], and a worker that
/// panics is reported as a failed result for its file.
pub async fn convert_batch(
    orchestrator: Arc<ConversionOrchestrator>,
    paths: Vec<PathBuf>,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> Vec<ConversionResult> {
    let total = paths.len();
    info!("Starting batch of {} files", total);
    if let Some(ref cb) = progress {
        cb.on_batch_start(total);
    }

    let mut results: Vec<(usize, ConversionResult)> =
        stream::iter(paths.into_iter().enumerate().map(|(index, path)| {
            let orchestrator = Arc::clone(&orchestrator);
            let progress = progress.clone();
            async move {
                if let Some(ref cb) = progress {
                    cb.on_file_start(index, total);
                }
                let task_path = path.clone();
                let result = tokio::task::spawn_blocking(move || orchestrator.convert(&task_path))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Conversion worker for {} died: {}", path.display(), e);
                        ConversionResult::failure(
                            &path,
                            &MurkdownError::Internal(format!("conversion worker failed: {e}")),
                        )
                    });
                if let Some(ref cb) = progress {
                    cb.on_file_complete(index, total, &result);
                }
                (index, result)
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ConversionResult> = results.into_iter().map(|(_, r)| r).collect();

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    info!("Batch complete: {}/{} files converted", succeeded, total);
    if let Some(ref cb) = progress {
        cb.on_batch_complete(total, succeeded);
    }
    results
}

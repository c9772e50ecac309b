//! The document-to-text capability the orchestrator delegates to.
//!
//! [`crate::ConversionOrchestrator`] never parses a document itself. It hands
//! the path to a [`DocumentConverter`] and only deals with what comes back.
//! Two backends ship with the crate:
//!
//! * [`MarkItDownCommand`] — runs the external `markitdown` executable and
//!   takes its stdout as the Markdown.
//! * [`PlainTextConverter`] — reads the file as UTF-8 verbatim.
//!
//! Anything else (a test double, an HTTP conversion service, an in-process
//! library) only needs to implement the trait. Plain closures already do.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Error type returned by converter backends.
///
/// Backends choose their own error types; the orchestrator only keeps the
/// `Display` text.
pub type ConverterError = Box<dyn std::error::Error + Send + Sync>;

/// What a backend extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// The extracted Markdown text. May be empty.
    pub text_content: String,
    /// Document title, when the backend can tell.
    pub title: Option<String>,
}

impl ConvertedDocument {
    pub fn new(text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Converts a local file to Markdown text.
///
/// Implementations must be `Send + Sync`: one orchestrator (and so one
/// converter) may serve several conversions at once, e.g. from
/// [`crate::batch::convert_batch`].
pub trait DocumentConverter: Send + Sync {
    /// Convert the file at `path`.
    fn convert_local(&self, path: &Path) -> Result<ConvertedDocument, ConverterError>;
}

impl<F> DocumentConverter for F
where
    F: Fn(&Path) -> Result<ConvertedDocument, ConverterError> + Send + Sync,
{
    fn convert_local(&self, path: &Path) -> Result<ConvertedDocument, ConverterError> {
        self(path)
    }
}

// ── PlainTextConverter ───────────────────────────────────────────────────

/// Reads the input as UTF-8 text and returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextConverter;

impl DocumentConverter for PlainTextConverter {
    fn convert_local(&self, path: &Path) -> Result<ConvertedDocument, ConverterError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| format!("'{}' is not valid UTF-8 text: {e}", path.display()))?;
        Ok(ConvertedDocument::new(text))
    }
}

// ── MarkItDownCommand ────────────────────────────────────────────────────

/// Default program name for [`MarkItDownCommand`].
pub const DEFAULT_MARKITDOWN_BIN: &str = "markitdown";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `<program> [args...] <path>` and uses its stdout as the Markdown.
///
/// A spawn failure, a non-zero exit, non-UTF-8 output, or running past the
/// timeout is reported as the converter error. On timeout the child is killed.
#[derive(Debug, Clone)]
pub struct MarkItDownCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for MarkItDownCommand {
    fn default() -> Self {
        Self::new(DEFAULT_MARKITDOWN_BIN)
    }
}

impl MarkItDownCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Extra arguments placed before the input path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the child and fail if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl DocumentConverter for MarkItDownCommand {
    fn convert_local(&self, path: &Path) -> Result<ConvertedDocument, ConverterError> {
        debug!(
            "Running {} on {}",
            self.program.display(),
            path.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to start '{}': {e}", self.program.display()))?;

        // Drain both pipes on their own threads so a chatty child never blocks
        // on a full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    if let Err(e) = child.kill() {
                        warn!("Failed to kill '{}': {}", self.program.display(), e);
                    }
                    let _ = child.wait();
                    return Err(format!(
                        "'{}' timed out after {}s",
                        self.program.display(),
                        limit.as_secs_f64()
                    )
                    .into());
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            let detail = String::from_utf8_lossy(&stderr);
            let detail = detail.trim();
            let msg = if detail.is_empty() {
                format!("'{}' exited with {status}", self.program.display())
            } else {
                format!(
                    "'{}' exited with {status}: {detail}",
                    self.program.display()
                )
            };
            return Err(msg.into());
        }

        let text = String::from_utf8(stdout).map_err(|e| {
            format!(
                "'{}' produced non-UTF-8 output: {e}",
                self.program.display()
            )
        })?;
        Ok(ConvertedDocument::new(text))
    }
}

type Drain = Option<thread::JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join(handle: Drain) -> Result<Vec<u8>, ConverterError> {
    match handle {
        None => Ok(Vec::new()),
        Some(h) => h
            .join()
            .map_err(|_| "pipe reader thread panicked")?
            .map_err(Into::into),
    }
}

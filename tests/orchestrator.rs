//! Integration tests for the conversion contract.
//!
//! Every test builds its fixtures in a fresh `TempDir` and drives the
//! orchestrator through stub converters, so no external `markitdown`
//! install is needed.
//!
//! Run with:
//!   cargo test --test orchestrator -- --nocapture

use murkdown::{
    convert_batch, stage_upload, ConversionOrchestrator, ConvertedDocument, ConverterError,
    DocumentConverter, FailureKind, OrchestratorConfig, PlainTextConverter, SessionView,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("murkdown=debug")
        .with_test_writer()
        .try_init();
}

/// Records how many times it was called, then answers with `reply`.
struct Spy<F> {
    calls: AtomicUsize,
    reply: F,
}

impl<F> Spy<F>
where
    F: Fn(&Path) -> Result<ConvertedDocument, ConverterError> + Send + Sync,
{
    fn new(reply: F) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> DocumentConverter for Spy<F>
where
    F: Fn(&Path) -> Result<ConvertedDocument, ConverterError> + Send + Sync,
{
    fn convert_local(&self, path: &Path) -> Result<ConvertedDocument, ConverterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(path)
    }
}

fn echo(path: &Path) -> Result<ConvertedDocument, ConverterError> {
    Ok(ConvertedDocument::new(std::fs::read_to_string(path)?))
}

fn boom(_: &Path) -> Result<ConvertedDocument, ConverterError> {
    Err("boom".into())
}

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let p = dir.path().join(name);
    std::fs::write(&p, content).expect("write fixture");
    p
}

// ── Validation ───────────────────────────────────────────────────────────────

#[test]
fn missing_file_never_reaches_converter() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("ghost.pdf");
    let spy = Spy::new(echo);
    let orch = ConversionOrchestrator::new(spy.clone());

    let expected = format!("File '{}' does not exist", missing.display());
    let (valid, reason) = orch.validate(&missing).into_parts();
    assert!(!valid);
    assert_eq!(reason.as_deref(), Some(expected.as_str()));

    let result = orch.convert(&missing);
    assert!(!result.is_success());
    assert_eq!(result.error(), Some(expected.as_str()));
    assert_eq!(result.original_file, missing);
    assert_eq!(result.failure_kind(), Some(FailureKind::Validation));
    assert_eq!(spy.calls(), 0);
}

#[test]
fn oversized_file_never_reaches_converter() {
    let dir = TempDir::new().unwrap();
    let big = write(&dir, "big.pdf", &vec![b'x'; 2 * 1024 * 1024 + 1]);
    let spy = Spy::new(echo);
    let config = OrchestratorConfig::builder().max_file_size_mb(2).build().unwrap();
    let orch = ConversionOrchestrator::with_config(spy.clone(), config);

    assert_eq!(orch.validate(&big).reason(), Some("File size exceeds 2MB limit"));
    let result = orch.convert(&big);
    assert_eq!(result.error(), Some("File size exceeds 2MB limit"));
    assert_eq!(spy.calls(), 0);
    assert!(!big.with_extension("md").exists());
}

#[test]
fn default_limit_message_says_100mb() {
    let dir = TempDir::new().unwrap();
    let f = write(&dir, "huge.pdf", b"");
    // Grow to just over 100 MiB without writing the bytes.
    std::fs::File::options()
        .write(true)
        .open(&f)
        .unwrap()
        .set_len(100 * 1024 * 1024 + 1)
        .unwrap();

    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));
    assert_eq!(orch.validate(&f).reason(), Some("File size exceeds 100MB limit"));
}

#[test]
fn unsupported_extension_reports_raw_extension() {
    let dir = TempDir::new().unwrap();
    let spy = Spy::new(echo);
    let orch = ConversionOrchestrator::new(spy.clone());

    let exe = write(&dir, "setup.EXE", b"MZ");
    assert_eq!(orch.validate(&exe).reason(), Some("Unsupported file format: EXE"));

    let md = write(&dir, "notes.md", b"# hi");
    let result = orch.convert(&md);
    assert_eq!(result.error(), Some("Unsupported file format: md"));
    assert_eq!(spy.calls(), 0);
}

#[test]
fn extension_case_does_not_matter() {
    let dir = TempDir::new().unwrap();
    let upper = write(&dir, "FILE.PDF", b"%PDF-1.7");
    let lower = write(&dir, "file.pdf", b"%PDF-1.7");
    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));

    assert_eq!(orch.validate(&upper), orch.validate(&lower));
    assert!(orch.validate(&upper).is_valid());
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn text_file_round_trips_to_sibling_md() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "greeting.txt", b"hello");
    let spy = Spy::new(echo);
    let orch = ConversionOrchestrator::new(spy.clone());

    let result = orch.convert(&input);
    assert!(result.is_success(), "got: {:?}", result.error());
    assert_eq!(result.content(), Some("hello"));
    assert_eq!(result.title(), None);
    assert_eq!(result.original_file, input);

    let expected_out = dir.path().join("greeting.md");
    assert_eq!(result.output_file(), Some(expected_out.as_path()));
    assert_eq!(std::fs::read_to_string(&expected_out).unwrap(), "hello");
    assert_eq!(spy.calls(), 1);
}

#[test]
fn title_is_passed_through() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "deck.pptx", b"PK");
    let orch = ConversionOrchestrator::new(Arc::new(|_: &Path| -> Result<ConvertedDocument, ConverterError> {
        Ok(ConvertedDocument::new("# Q3").with_title("Quarterly review"))
    }));

    let result = orch.convert(&input);
    assert_eq!(result.title(), Some("Quarterly review"));
    assert_eq!(result.content(), Some("# Q3"));
}

#[test]
fn empty_content_is_still_success() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "blank.txt", b"");
    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));

    let result = orch.convert(&input);
    assert!(result.is_success());
    assert_eq!(result.content(), Some(""));
    assert_eq!(std::fs::read_to_string(dir.path().join("blank.md")).unwrap(), "");
}

#[test]
fn converter_failure_is_captured_verbatim() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.docx", b"PK");
    let orch = ConversionOrchestrator::new(Spy::new(boom));

    let result = orch.convert(&input);
    assert!(!result.is_success());
    assert_eq!(result.error(), Some("boom"));
    assert_eq!(result.failure_kind(), Some(FailureKind::Conversion));
    assert_eq!(result.content(), None);
    assert_eq!(result.output_file(), None);
    assert!(!dir.path().join("report.md").exists());
}

#[test]
fn converter_failure_leaves_existing_md_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "report.docx", b"PK");
    let existing = write(&dir, "report.md", b"previous run");
    let orch = ConversionOrchestrator::new(Spy::new(boom));

    assert!(!orch.convert(&input).is_success());
    assert_eq!(std::fs::read_to_string(existing).unwrap(), "previous run");
}

#[cfg(unix)]
#[test]
fn unwritable_output_is_a_persist_failure() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write(&dir, "locked.txt", b"hello");
    let mut perms = std::fs::metadata(dir.path()).unwrap().permissions();
    perms.set_mode(0o555);
    std::fs::set_permissions(dir.path(), perms.clone()).unwrap();

    // Root ignores directory permissions; nothing to observe in that case.
    let canary = dir.path().join(".canary");
    if std::fs::write(&canary, b"").is_ok() {
        let _ = std::fs::remove_file(&canary);
        perms.set_mode(0o755);
        std::fs::set_permissions(dir.path(), perms).unwrap();
        return;
    }

    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));
    let result = orch.convert(&input);

    perms.set_mode(0o755);
    std::fs::set_permissions(dir.path(), perms).unwrap();

    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::Persist));
    assert!(result.error().unwrap().contains("locked.md"));
    assert!(!dir.path().join("locked.md").exists());
}

#[test]
fn directory_in_the_way_is_a_persist_failure() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "locked.txt", b"hello");
    let blocker = dir.path().join("locked.md");
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("keep"), b"x").unwrap();

    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));
    let result = orch.convert(&input);

    assert!(!result.is_success());
    assert_eq!(result.failure_kind(), Some(FailureKind::Persist));
    assert!(result.output_file().is_none());
    assert!(blocker.join("keep").is_file());
    // Only the input, the blocking directory, and no stray temp file.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[cfg(unix)]
#[test]
fn new_output_gets_the_same_mode_as_fs_write() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write(&dir, "notes.txt", b"hello");
    let reference = write(&dir, "reference.bin", b"");

    let result = ConversionOrchestrator::new(Arc::new(PlainTextConverter)).convert(&input);
    assert!(result.is_success());

    let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&dir.path().join("notes.md")), mode(&reference));
}

#[cfg(unix)]
#[test]
fn existing_output_keeps_its_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write(&dir, "a.txt", b"fresh");
    let existing = write(&dir, "a.md", b"stale");
    std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();

    let result = ConversionOrchestrator::new(Arc::new(PlainTextConverter)).convert(&input);
    assert!(result.is_success());

    let meta = std::fs::metadata(&existing).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o644);
    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "fresh");
}

#[test]
fn repeated_conversion_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "page.html", b"<h1>Hi</h1>");
    let spy = Spy::new(|_: &Path| -> Result<ConvertedDocument, ConverterError> {
        Ok(ConvertedDocument::new("# Hi").with_title("Hi"))
    });
    let orch = ConversionOrchestrator::new(spy.clone());

    let first = orch.convert(&input);
    let second = orch.convert(&input);
    assert!(first.is_success() && second.is_success());
    assert_eq!(first.content(), second.content());
    assert_eq!(first.title(), second.title());
    assert_eq!(first.output_file(), second.output_file());
    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(dir.path().join("page.md")).unwrap(), "# Hi");
    assert_eq!(spy.calls(), 2);
}

#[test]
fn shared_orchestrator_across_threads() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..8)
        .map(|i| write(&dir, &format!("n{i}.txt"), format!("note {i}").as_bytes()))
        .collect();
    let spy = Spy::new(echo);
    let orch = Arc::new(ConversionOrchestrator::new(spy.clone()));

    std::thread::scope(|s| {
        for input in &inputs {
            let orch = Arc::clone(&orch);
            s.spawn(move || assert!(orch.convert(input).is_success()));
        }
    });
    assert_eq!(spy.calls(), 8);
}

// ── Uploads, batches, session ────────────────────────────────────────────────

#[test]
fn staged_upload_converts_and_cleans_up() {
    let staged = stage_upload("memo.txt", b"staged text").unwrap();
    let orch = ConversionOrchestrator::new(Arc::new(PlainTextConverter));

    let result = orch.convert(staged.path());
    assert_eq!(result.content(), Some("staged text"));
    let out = result.output_file().unwrap().to_path_buf();
    assert!(out.exists());

    drop(staged);
    assert!(!out.exists());
}

#[tokio::test]
async fn batch_mixes_successes_and_failures() {
    let dir = TempDir::new().unwrap();
    let ok = write(&dir, "ok.txt", b"fine");
    let bad = write(&dir, "bad.wav", b"RIFF");
    let spy = Spy::new(|p: &Path| -> Result<ConvertedDocument, ConverterError> {
        if p.extension().is_some_and(|e| e == "wav") {
            Err("no speech backend".into())
        } else {
            echo(p)
        }
    });
    let orch = Arc::new(ConversionOrchestrator::new(spy.clone()));

    let results = convert_batch(orch, vec![ok.clone(), bad.clone()], 2, None).await;
    let session = results
        .iter()
        .fold(SessionView::new(), |s, r| s.begin(&r.original_file).finish(r.clone()));

    assert_eq!(results[0].content(), Some("fine"));
    assert_eq!(results[1].error(), Some("no speech backend"));
    assert_eq!(session.succeeded(), 1);
    assert_eq!(session.failed(), 1);
    assert!(!session.is_converting);
    assert_eq!(spy.calls(), 2);
}

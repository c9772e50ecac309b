//! CLI binary for murkdown.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionOrchestrator` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use murkdown::{
    convert_batch, inspect, stage_upload, supported_formats, BatchProgressCallback,
    ConversionOrchestrator, ConversionResult, DocumentConverter, MarkItDownCommand,
    OrchestratorConfig, PlainTextConverter, ProgressCallback, SessionView,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const RULE: &str = "------------------------------------------------------------";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar for multi-file runs. Files may finish out of order.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file_complete(&self, _index: usize, _total: usize, result: &ConversionResult) {
        let name = result.original_file.display().to_string();
        match result.error() {
            None => self.bar.println(format!("  {} {}", green("✓"), name)),
            Some(e) => self.bar.println(format!("  {} {}  {}", red("✗"), name, red(e))),
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a file; writes report.md next to it and prints a preview
  murkdown report.pdf

  # Print the whole converted text
  murkdown --full slides.pptx

  # Convert several files, four at a time
  murkdown -c 4 a.docx b.xlsx c.pdf

  # Convert an upload piped on stdin (Markdown goes to stdout)
  cat scan.png | murkdown --upload-name scan.png -

  # Plain-text backend (no external tool needed)
  murkdown --backend text notes.txt

  # File details only, no conversion
  murkdown --inspect-only --json report.pdf

ENVIRONMENT VARIABLES:
  MURKDOWN_BACKEND        Converter backend (markitdown, text)
  MURKDOWN_CONVERTER_BIN  Path to the markitdown executable
  MURKDOWN_MAX_SIZE_MB    Upload size ceiling in MiB
  RUST_LOG                Override log filter
"#;

/// Convert documents to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "murkdown",
    version,
    about = "Convert documents (PDF, Office, HTML, images, audio) to Markdown",
    long_about = "Validate documents and convert them to Markdown through the external \
markitdown tool (or a plain-text passthrough). Each converted file is written next to its \
input with a .md extension.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Files to convert. `-` reads one upload from stdin.
    #[arg(required_unless_present = "list_formats")]
    inputs: Vec<String>,

    /// Converter backend.
    #[arg(long, env = "MURKDOWN_BACKEND", value_enum, default_value = "markitdown")]
    backend: BackendArg,

    /// markitdown executable.
    #[arg(long, env = "MURKDOWN_CONVERTER_BIN", default_value = murkdown::converter::DEFAULT_MARKITDOWN_BIN)]
    converter_bin: PathBuf,

    /// Kill the converter after this many seconds (0 = no limit).
    #[arg(long, env = "MURKDOWN_TIMEOUT", default_value_t = 0)]
    timeout: u64,

    /// Reject inputs larger than this many MiB.
    #[arg(long, env = "MURKDOWN_MAX_SIZE_MB", default_value_t = 100,
          value_parser = clap::value_parser!(u64).range(1..))]
    max_size_mb: u64,

    /// Number of files converted at once.
    #[arg(short, long, env = "MURKDOWN_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// File name for a stdin upload (its extension selects the format).
    #[arg(long, env = "MURKDOWN_UPLOAD_NAME")]
    upload_name: Option<String>,

    /// Print the full converted text instead of a preview.
    #[arg(long, env = "MURKDOWN_FULL")]
    full: bool,

    /// Preview length in characters.
    #[arg(long, env = "MURKDOWN_PREVIEW_CHARS", default_value_t = 500,
          value_parser = clap::value_parser!(u64).range(100..=1000))]
    preview_chars: u64,

    /// Output structured JSON instead of the text report.
    #[arg(long, env = "MURKDOWN_JSON")]
    json: bool,

    /// List supported extensions and MIME types, then exit.
    #[arg(long)]
    list_formats: bool,

    /// Print file details only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "MURKDOWN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MURKDOWN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MURKDOWN_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Markitdown,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.inputs.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-formats mode ────────────────────────────────────────────────
    if cli.list_formats {
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(supported_formats())
                    .context("Failed to serialise formats")?
            );
        } else {
            for (ext, mime) in supported_formats() {
                println!("{ext:<6} {mime}");
            }
        }
        return Ok(());
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let meta = inspect(input).with_context(|| format!("Failed to inspect {input}"))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
                );
            } else {
                println!("File:  {}", meta.filename);
                println!("Size:  {:.1} KB", meta.size as f64 / 1024.0);
                println!("Type:  {}", meta.mime_type);
            }
        }
        return Ok(());
    }

    let orchestrator = Arc::new(build_orchestrator(&cli)?);

    // ── Stdin upload ─────────────────────────────────────────────────────
    if cli.inputs.iter().any(|i| i == "-") {
        if cli.inputs.len() != 1 {
            anyhow::bail!("'-' (stdin) cannot be combined with other inputs");
        }
        return convert_stdin(&cli, orchestrator).await;
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let paths: Vec<PathBuf> = cli.inputs.iter().map(PathBuf::from).collect();
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let results = convert_batch(orchestrator, paths, cli.concurrency, progress).await;
    let session = results
        .iter()
        .fold(SessionView::new(), |s, r| s.begin(&r.original_file).finish(r.clone()));

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Failed to serialise results")?
        );
    } else if !cli.quiet {
        for result in &results {
            report(&cli, result)?;
        }
        if results.len() > 1 {
            eprintln!(
                "{} {}/{} files converted",
                if session.failed() == 0 { green("✔") } else { red("✘") },
                bold(&session.succeeded().to_string()),
                results.len()
            );
        }
    } else {
        for result in &results {
            if let Some(e) = result.error() {
                eprintln!("Error converting file: {e}");
            }
        }
    }

    if session.failed() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to a `ConversionOrchestrator`.
fn build_orchestrator(cli: &Cli) -> Result<ConversionOrchestrator> {
    let converter: Arc<dyn DocumentConverter> = match cli.backend {
        BackendArg::Markitdown => {
            let mut cmd = MarkItDownCommand::new(&cli.converter_bin);
            if cli.timeout > 0 {
                cmd = cmd.timeout(Duration::from_secs(cli.timeout));
            }
            Arc::new(cmd)
        }
        BackendArg::Text => Arc::new(PlainTextConverter),
    };

    let config = OrchestratorConfig::builder()
        .max_file_size_mb(cli.max_size_mb)
        .build()
        .context("Invalid configuration")?;

    Ok(ConversionOrchestrator::with_config(converter, config))
}

/// Stage stdin as an upload, convert it, and print the Markdown to stdout.
///
/// The staged file and its `.md` live in a temp dir removed on return, so the
/// content is the only output.
async fn convert_stdin(cli: &Cli, orchestrator: Arc<ConversionOrchestrator>) -> Result<()> {
    let name = cli
        .upload_name
        .clone()
        .context("--upload-name is required when reading from stdin")?;

    let bytes = tokio::task::spawn_blocking(|| {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map(|_| buf)
    })
    .await
    .context("stdin reader failed")?
    .context("Failed to read stdin")?;

    let staged = stage_upload(&name, &bytes).context("Failed to stage upload")?;
    let path = staged.path().to_path_buf();
    let result = tokio::task::spawn_blocking(move || orchestrator.convert(&path))
        .await
        .context("Conversion worker failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if let Some(content) = result.content() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        if !content.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // Returning (rather than exiting) lets `staged` clean up its temp dir.
    match result.error() {
        None => Ok(()),
        Some(e) => Err(anyhow::anyhow!("Error converting file: {e}")),
    }
}

/// Print the per-file report: input, output, and a preview or the full text.
fn report(cli: &Cli, result: &ConversionResult) -> Result<()> {
    let (Some(content), Some(output_file)) = (result.content(), result.output_file()) else {
        eprintln!(
            "{} Error converting file '{}': {}",
            red("✘"),
            result.original_file.display(),
            result.error().unwrap_or_default()
        );
        return Ok(());
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "\n{}", green("Conversion successful!"))?;
    writeln!(out, "Input file: {}", result.original_file.display())?;
    writeln!(out, "Output file: {}", bold(&output_file.display().to_string()))?;
    if let Some(title) = result.title() {
        writeln!(out, "Title: {title}")?;
    }
    writeln!(out, "\nPreview of the result:")?;
    writeln!(out, "{RULE}")?;

    if cli.full {
        writeln!(out, "{content}")?;
    } else {
        let preview = result
            .preview(cli.preview_chars as usize)
            .unwrap_or_default();
        writeln!(out, "{preview}")?;
        if content.chars().count() > cli.preview_chars as usize {
            writeln!(
                out,
                "\n{}",
                dim("Note: This is just a preview. Use --full flag to see entire content")
            )?;
            writeln!(out, "{}", dim(&format!("Or check the output file: {}", output_file.display())))?;
        }
    }
    writeln!(out, "{RULE}")?;
    Ok(())
}

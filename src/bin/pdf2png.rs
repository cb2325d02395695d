//! CLI binary for edgequake-pdf2png.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, reports progress, and turns every error into a
//! message and an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2png::{
    convert_with_engine, inspect_with_engine, ConversionConfig, ConversionProgressCallback,
    ErrorClass, OutputFile, Pdf2PngError, PdfiumEngine, ProgressCallback, DEFAULT_DPI,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the page currently being rendered.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut g| g.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Remove the bar if the conversion ended without `on_conversion_complete`.
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut g) = self.page_started.lock() {
            *g = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, file: &OutputFile) {
        let secs = self.page_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>4}/{:<4}  {:<12}  {:>10}  {}",
            green("✓"),
            page_num,
            total,
            format!("{}×{}", file.width, file.height),
            dim(&human_bytes(file.bytes)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.page_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>4}/{:<4}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(error),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _total_pages: usize, files_written: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered",
            green("✔"),
            bold(&files_written.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page at 300 DPI
  pdf2png -i document.pdf -o pages/

  # Screen resolution
  pdf2png -i slides.pdf -o thumbs/ --dpi 96

  # Encrypted document
  pdf2png -i locked.pdf -o out/ --password s3cret

  # Page count, sizes and info dictionary only
  pdf2png -i document.pdf --inspect-only

  # Machine-readable summary
  pdf2png -i document.pdf -o pages/ --json > summary.json

OUTPUT:
  One PNG per page: page_0001.png, page_0002.png, …
  Pixel size = page size in points × DPI / 72.

EXIT CODES:
  0  success
  2  PDF engine unavailable
  3  input missing, unreadable, or locked
  4  input is not a valid PDF
  5  PDF has no pages
  6  a page failed to render or write (earlier pages are kept)
  7  output directory could not be created
  8  invalid option value

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH          Path to libpdfium (file or directory)
  PDFIUM_LOCATE_CACHE_DIR  Where a bundled pdfium is extracted
  RUST_LOG                 Log filter, e.g. RUST_LOG=edgequake_pdf2png=debug
"#;

/// Convert each page of a PDF into a PNG image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Convert each page of a PDF into a numbered PNG image",
    long_about = "Render every page of a PDF document with PDFium and write it to \
OUTPUT/page_0001.png, page_0002.png, … at the requested resolution.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file path.
    #[arg(short, long, env = "PDF2PNG_INPUT")]
    input: PathBuf,

    /// Output directory (created if missing).
    #[arg(short, long, env = "PDF2PNG_OUTPUT", required_unless_present = "inspect_only")]
    output: Option<PathBuf>,

    /// Rendering resolution in dots per inch.
    #[arg(long, env = "PDF2PNG_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PNG_PASSWORD")]
    password: Option<String>,

    /// Print a JSON summary (or metadata with --inspect-only) on stdout.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Print PDF metadata only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress && !self.json && !self.inspect_only
    }
}

fn main() -> ExitCode {
    // clap's own usage exit status (2) would collide with "engine unavailable".
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 8 } else { 0 });
        }
    };
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", red("✘"));
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn init_logging(cli: &Cli) {
    // The progress bar gives all the feedback that matters, so library INFO
    // logs are suppressed while it is shown.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.show_progress() {
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
}

fn run(cli: &Cli) -> Result<()> {
    // ── Ensure PDFium engine is available ────────────────────────────────
    // Fails fast before any file is touched.
    let engine = PdfiumEngine::new().context("PDF engine setup failed")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect_with_engine(&engine, &cli.input, cli.password.as_deref())
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
            if let Some(first) = meta.page_sizes.first() {
                let (w, h) = (first.width, first.height);
                let px = |pt: f32| (f64::from(pt) * f64::from(cli.dpi) / 72.0).round();
                println!(
                    "Page 1 size:  {w:.1} × {h:.1} pt  ({} × {} px at {} DPI)",
                    px(w),
                    px(h),
                    cli.dpi
                );
            }
        }
        return Ok(());
    }

    let output_dir = cli
        .output
        .as_ref()
        .context("--output is required unless --inspect-only is given")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress = cli.show_progress().then(CliProgressCallback::new_dynamic);

    let mut builder = ConversionConfig::builder().dpi(cli.dpi);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = convert_with_engine(&engine, &cli.input, output_dir, &config);
    if let Some(ref cb) = progress {
        cb.clear();
    }
    let output = result.with_context(|| format!("Failed to convert '{}'", cli.input.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        println!(
            "PDF '{}' converted to {} images in '{}'",
            cli.input.display(),
            output.page_count(),
            output_dir.display()
        );
    }

    Ok(())
}

/// Exit status for an error, chosen by the library error it wraps.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<Pdf2PngError>())
        .map(|e| match e.class() {
            ErrorClass::Setup => 2,
            ErrorClass::Open => 3,
            ErrorClass::InvalidDocument => 4,
            ErrorClass::EmptyDocument => 5,
            ErrorClass::PageRender => 6,
            ErrorClass::Directory => 7,
            ErrorClass::Config => 8,
        })
        .unwrap_or(1)
}

fn human_bytes(n: u64) -> String {
    const KIB: f64 = 1024.0;
    let n = n as f64;
    if n < KIB {
        format!("{n} B")
    } else if n < KIB * KIB {
        format!("{:.1} KiB", n / KIB)
    } else {
        format!("{:.1} MiB", n / (KIB * KIB))
    }
}

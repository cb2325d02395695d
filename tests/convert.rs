//! Integration tests for the conversion batch.
//!
//! These run against a deterministic in-memory engine, so they need neither
//! pdfium nor sample PDFs. Real-engine coverage lives in `tests/e2e.rs`.

use edgequake_pdf2png::{
    convert_with_engine, inspect_with_engine, ConversionConfig, ConversionProgressCallback,
    Document, ErrorClass, OpenFailure, OutputFile, PageSize, Pdf2PngError, RenderEngine,
    RenderRequest,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// ── Test engine ──────────────────────────────────────────────────────────────

const LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

#[derive(Default)]
struct FakeEngine {
    pages: Vec<PageSize>,
    /// Page index whose render fails.
    fail_at: Option<usize>,
    /// Returned from `open` instead of a document.
    open_failure: Option<OpenFailure>,
    /// Password the document is locked with.
    password: Option<String>,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl FakeEngine {
    fn with_pages(pages: Vec<PageSize>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct FakeDocument<'a> {
    engine: &'a FakeEngine,
}

impl Drop for FakeDocument<'_> {
    fn drop(&mut self) {
        self.engine.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl Document for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.engine.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<PageSize, String> {
        self.engine
            .pages
            .get(index)
            .copied()
            .ok_or_else(|| format!("no page {index}"))
    }

    fn render_page(&self, request: &RenderRequest) -> Result<DynamicImage, String> {
        if self.engine.fail_at == Some(request.page_index) {
            return Err("simulated rasterisation failure".into());
        }
        let (w, h) = request.pixel_size(self.page_size(request.page_index)?);
        let shade = (request.page_index * 40 % 256) as u8;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([shade, (x % 256) as u8, (y % 256) as u8, 255])
        })))
    }
}

impl RenderEngine for FakeEngine {
    fn open<'a>(
        &'a self,
        _path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn Document + 'a>, OpenFailure> {
        if let Some(ref failure) = self.open_failure {
            return Err(failure.clone());
        }
        match (self.password.as_deref(), password) {
            (Some(_), None) => return Err(OpenFailure::PasswordRequired),
            (Some(expected), Some(given)) if expected != given => {
                return Err(OpenFailure::WrongPassword)
            }
            _ => {}
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDocument { engine: self }))
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A file that passes the `%PDF` header check.
fn pdf_stub(dir: &Path) -> PathBuf {
    let path = dir.join("input.pdf");
    std::fs::write(&path, b"%PDF-1.7\n%%EOF\n").unwrap();
    path
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Route library logs through the test harness; `RUST_LOG` picks the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(dpi: u32) -> ConversionConfig {
    ConversionConfig::builder().dpi(dpi).build().unwrap()
}

// ── Output layout ────────────────────────────────────────────────────────────

#[test]
fn n_pages_produce_exactly_n_numbered_files() {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER; 3]);

    let output = convert_with_engine(&engine, &input, &out, &config(72)).unwrap();

    assert_eq!(output.page_count(), 3);
    assert_eq!(
        file_names(&out),
        ["page_0001.png", "page_0002.png", "page_0003.png"]
    );
    let numbers: Vec<_> = output.files.iter().map(|f| f.page_num).collect();
    assert_eq!(numbers, [1, 2, 3]);
    assert_eq!(output.output_dir, out);
}

#[test]
fn summary_serialises_to_json() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER; 2]);

    let output = convert_with_engine(&engine, &input, &out, &config(72)).unwrap();

    let json = serde_json::to_value(&output).expect("ConversionOutput must serialise to JSON");
    assert_eq!(json["dpi"], 72);
    assert_eq!(json["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["files"][1]["page_num"], 2);
    assert_eq!(json["files"][1]["width"], 612);

    let back: edgequake_pdf2png::ConversionOutput =
        serde_json::from_value(json).expect("JSON must deserialize back to ConversionOutput");
    assert_eq!(back.files, output.files);
}

#[test]
fn header_preceded_by_blank_lines_reaches_the_engine() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("crlf.pdf");
    std::fs::write(&input, b"\r\n%PDF-1.4\n1 0 obj<<>>endobj\n%%EOF\n").unwrap();
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER]);

    let output = convert_with_engine(&engine, &input, &out, &config(72)).unwrap();

    assert_eq!(output.page_count(), 1);
    assert_eq!((engine.opened(), engine.closed()), (1, 1));
}

#[test]
fn missing_output_directory_is_created() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("deep").join("nested").join("pages");
    let engine = FakeEngine::with_pages(vec![LETTER; 2]);

    convert_with_engine(&engine, &input, &out, &config(72)).unwrap();

    assert!(out.is_dir());
    assert_eq!(file_names(&out), ["page_0001.png", "page_0002.png"]);
}

// ── Resolution ───────────────────────────────────────────────────────────────

#[test]
fn dpi_72_gives_one_pixel_per_point() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let landscape = PageSize {
        width: 300.0,
        height: 200.0,
    };
    let engine = FakeEngine::with_pages(vec![LETTER, landscape]);

    let output = convert_with_engine(&engine, &input, &out, &config(72)).unwrap();

    let png = image::open(out.join("page_0002.png")).unwrap();
    assert_eq!((png.width(), png.height()), (300, 200));
    assert_eq!((output.files[0].width, output.files[0].height), (612, 792));
}

#[test]
fn dpi_300_scales_by_300_over_72() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER]);

    let output = convert_with_engine(&engine, &input, &out, &ConversionConfig::default()).unwrap();

    assert_eq!(output.dpi, 300);
    let png = image::open(&output.files[0].path).unwrap();
    assert_eq!((png.width(), png.height()), (2550, 3300));
}

#[test]
fn repeated_runs_produce_identical_files() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let engine = FakeEngine::with_pages(vec![LETTER, LETTER]);

    let a = work.path().join("a");
    let b = work.path().join("b");
    convert_with_engine(&engine, &input, &a, &config(36)).unwrap();
    convert_with_engine(&engine, &input, &b, &config(36)).unwrap();

    assert_eq!(file_names(&a), file_names(&b));
    for name in file_names(&a) {
        assert_eq!(
            std::fs::read(a.join(&name)).unwrap(),
            std::fs::read(b.join(&name)).unwrap(),
            "{name} differs between runs"
        );
    }
}

// ── Failure scenarios ────────────────────────────────────────────────────────

#[test]
fn empty_document_writes_nothing_and_closes_once() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![]);

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();

    assert!(matches!(err, Pdf2PngError::EmptyDocument { .. }));
    assert_eq!(err.class(), ErrorClass::EmptyDocument);
    assert!(file_names(&out).is_empty());
    assert_eq!((engine.opened(), engine.closed()), (1, 1));
}

#[test]
fn text_file_renamed_pdf_is_invalid_document() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("notes.pdf");
    std::fs::write(&input, "just some text\n").unwrap();
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER]);

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();

    assert_eq!(err.class(), ErrorClass::InvalidDocument);
    assert_eq!(engine.opened(), 0);
    assert!(!out.exists() || file_names(&out).is_empty());
}

#[test]
fn unparseable_pdf_is_invalid_document() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine {
        open_failure: Some(OpenFailure::InvalidFormat("FormatError".into())),
        ..FakeEngine::with_pages(vec![LETTER])
    };

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();

    assert!(matches!(err, Pdf2PngError::CorruptPdf { .. }));
    assert!(file_names(&out).is_empty());
}

#[test]
fn missing_input_is_open_error_and_creates_no_directory() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER]);

    let err =
        convert_with_engine(&engine, work.path().join("nope.pdf"), &out, &config(72)).unwrap_err();

    assert!(matches!(err, Pdf2PngError::FileNotFound { .. }));
    assert_eq!(err.class(), ErrorClass::Open);
    assert!(!out.exists());
    assert_eq!(engine.opened(), 0);
}

#[test]
fn page_failure_aborts_and_keeps_earlier_pages() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine {
        fail_at: Some(2),
        ..FakeEngine::with_pages(vec![LETTER; 4])
    };

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();

    match err {
        Pdf2PngError::PageRenderFailed { page_index, ref detail } => {
            assert_eq!(page_index, 2);
            assert!(detail.contains("simulated"), "got: {detail}");
        }
        ref other => panic!("expected PageRenderFailed, got {other:?}"),
    }
    assert!(err.to_string().contains("Page 3"));
    assert_eq!(file_names(&out), ["page_0001.png", "page_0002.png"]);
    assert_eq!((engine.opened(), engine.closed()), (1, 1));
}

#[test]
fn write_failure_aborts_with_the_page_index() {
    init_tracing();
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    // A directory where page 2's file belongs makes its write fail.
    std::fs::create_dir_all(out.join("page_0002.png")).unwrap();
    let engine = FakeEngine::with_pages(vec![LETTER; 3]);

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();

    assert!(
        matches!(err, Pdf2PngError::PageRenderFailed { page_index: 1, .. }),
        "got: {err:?}"
    );
    assert!(out.join("page_0001.png").is_file());
    assert!(!out.join("page_0003.png").exists());
    let names = file_names(&out);
    assert!(!names.iter().any(|n| n.ends_with(".tmp")), "left behind: {names:?}");
    assert_eq!((engine.opened(), engine.closed()), (1, 1));
}

#[test]
fn document_is_closed_once_after_success() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let engine = FakeEngine::with_pages(vec![LETTER; 2]);

    convert_with_engine(&engine, &input, work.path().join("out"), &config(10)).unwrap();

    assert_eq!((engine.opened(), engine.closed()), (1, 1));
}

#[test]
fn locked_document_needs_the_right_password() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine {
        password: Some("s3cret".into()),
        ..FakeEngine::with_pages(vec![LETTER])
    };

    let err = convert_with_engine(&engine, &input, &out, &config(72)).unwrap_err();
    assert!(matches!(err, Pdf2PngError::PasswordRequired { .. }));

    let wrong = ConversionConfig::builder().dpi(72).password("guess").build().unwrap();
    let err = convert_with_engine(&engine, &input, &out, &wrong).unwrap_err();
    assert!(matches!(err, Pdf2PngError::WrongPassword { .. }));

    let right = ConversionConfig::builder().dpi(72).password("s3cret").build().unwrap();
    let output = convert_with_engine(&engine, &input, &out, &right).unwrap();
    assert_eq!(output.page_count(), 1);
}

#[test]
fn zero_dpi_set_directly_is_rejected() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let out = work.path().join("out");
    let engine = FakeEngine::with_pages(vec![LETTER]);
    let config = ConversionConfig {
        dpi: 0,
        ..ConversionConfig::default()
    };

    let err = convert_with_engine(&engine, &input, &out, &config).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Config);
    assert!(!out.exists());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ConversionProgressCallback for RecordingCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.push(format!("start {total_pages}"));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.push(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, _total_pages: usize, file: &OutputFile) {
        assert!(file.path.exists());
        self.push(format!("done {page_num}"));
    }

    fn on_page_error(&self, page_num: usize, _total_pages: usize, _error: &str) {
        self.push(format!("error {page_num}"));
    }

    fn on_conversion_complete(&self, total_pages: usize, files_written: usize) {
        self.push(format!("complete {total_pages} {files_written}"));
    }
}

#[test]
fn progress_events_follow_page_order() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let engine = FakeEngine::with_pages(vec![LETTER; 2]);
    let recorder = Arc::new(RecordingCallback::default());
    let config = ConversionConfig::builder()
        .dpi(18)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    convert_with_engine(&engine, &input, work.path().join("out"), &config).unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        ["start 2", "page 1", "done 1", "page 2", "done 2", "complete 2 2"]
    );
}

#[test]
fn progress_reports_the_failing_page_and_no_completion() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let engine = FakeEngine {
        fail_at: Some(0),
        ..FakeEngine::with_pages(vec![LETTER; 2])
    };
    let recorder = Arc::new(RecordingCallback::default());
    let config = ConversionConfig::builder()
        .dpi(18)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    assert!(convert_with_engine(&engine, &input, work.path().join("out"), &config).is_err());

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(events, ["start 2", "page 1", "error 1"]);
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[test]
fn inspect_reports_page_geometry_without_writing() {
    let work = tempfile::tempdir().unwrap();
    let input = pdf_stub(work.path());
    let engine = FakeEngine::with_pages(vec![LETTER, LETTER, LETTER]);

    let meta = inspect_with_engine(&engine, &input, None).unwrap();

    assert_eq!(meta.page_count, 3);
    assert_eq!(meta.page_sizes, vec![LETTER; 3]);
    assert_eq!(file_names(work.path()), ["input.pdf"]);
    assert_eq!(engine.closed(), 1);
}

//! Conversion entry points.
//!
//! [`convert`] binds pdfium and runs [`convert_with_engine`], which is the
//! whole batch: resolve input → create output directory → open document →
//! reject empty documents → render, encode, and write each page in order.
//!
//! The first page that fails aborts the batch. Files already written for
//! earlier pages stay on disk; nothing is cleaned up.

use crate::config::ConversionConfig;
use crate::engine::{self, OpenFailure, Page, RenderEngine};
use crate::error::Pdf2PngError;
use crate::output::{ConversionOutput, DocumentMetadata, OutputFile};
use crate::pipeline::render::PdfiumEngine;
use crate::pipeline::{encode, input, write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert every page of a PDF into `output_dir/page_NNNN.png`.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`Pdf2PngError::PdfiumBindingFailed`]: no pdfium library could be loaded
/// - open / invalid-document errors: nothing is written, and for a missing
///   input the output directory is not created either
/// - [`Pdf2PngError::EmptyDocument`]: the PDF has no pages
/// - [`Pdf2PngError::PageRenderFailed`]: a page failed; earlier pages remain
/// - [`Pdf2PngError::OutputDirFailed`]: the output directory could not be created
pub fn convert(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PngError> {
    let engine = PdfiumEngine::new()?;
    convert_with_engine(&engine, input_path, output_dir, config)
}

/// [`convert`] against any [`RenderEngine`].
pub fn convert_with_engine(
    engine: &dyn RenderEngine,
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2PngError> {
    let start = Instant::now();
    let output_dir = output_dir.as_ref();

    if config.dpi == 0 {
        return Err(Pdf2PngError::InvalidConfig(
            "DPI must be a positive integer, got 0".into(),
        ));
    }

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_input(input_path.as_ref())?;
    info!("Starting conversion: {}", pdf_path.display());

    // ── Step 2: Output directory ─────────────────────────────────────────
    write::prepare_output_dir(output_dir)?;

    // ── Step 3: Open document ────────────────────────────────────────────
    let document = engine
        .open(&pdf_path, config.password.as_deref())
        .map_err(|f| open_error(&pdf_path, f))?;

    // ── Step 4: Reject empty documents ───────────────────────────────────
    let total_pages = document.page_count();
    if total_pages == 0 {
        return Err(Pdf2PngError::EmptyDocument { path: pdf_path });
    }
    info!("PDF loaded: {} pages at {} DPI", total_pages, config.dpi);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    // ── Step 5: Render, encode, write ────────────────────────────────────
    let mut files = Vec::with_capacity(total_pages);
    for page in engine::pages(document.as_ref()) {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page.number(), total_pages);
        }

        let file = match convert_page(page, config.dpi, output_dir) {
            Ok(file) => file,
            Err(detail) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page.number(), total_pages, &detail);
                }
                return Err(Pdf2PngError::PageRenderFailed {
                    page_index: page.index(),
                    detail,
                });
            }
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page.number(), total_pages, &file);
        }
        files.push(file);
    }

    // ── Step 6: Release the document ─────────────────────────────────────
    drop(document);

    let output = ConversionOutput {
        input: pdf_path,
        output_dir: output_dir.to_path_buf(),
        dpi: config.dpi,
        files,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} images in {}ms → {}",
        output.page_count(),
        output.duration_ms,
        output_dir.display()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, output.page_count());
    }

    Ok(output)
}

/// Read PDF metadata without rendering any page.
pub fn inspect(
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2PngError> {
    let engine = PdfiumEngine::new()?;
    inspect_with_engine(&engine, input_path, password)
}

/// [`inspect`] against any [`RenderEngine`].
pub fn inspect_with_engine(
    engine: &dyn RenderEngine,
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2PngError> {
    let pdf_path = input::resolve_input(input_path.as_ref())?;
    let document = engine
        .open(&pdf_path, password)
        .map_err(|f| open_error(&pdf_path, f))?;
    Ok(document.metadata())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Render, encode, and write one page. Errors are returned as the detail
/// string of [`Pdf2PngError::PageRenderFailed`].
fn convert_page(page: Page<'_>, dpi: u32, output_dir: &Path) -> Result<OutputFile, String> {
    let image = page.render(dpi)?;
    let png = encode::encode_png(&image).map_err(|e| format!("PNG encoding failed: {e}"))?;
    let path = write::write_page(output_dir, page.number(), &png)
        .map_err(|e| format!("writing {} failed: {e}", write::page_file_name(page.number())))?;

    debug!("Wrote page {} → {}", page.number(), path.display());

    Ok(OutputFile {
        page_num: page.number(),
        path,
        width: image.width(),
        height: image.height(),
        bytes: png.len() as u64,
    })
}

/// Translate an engine open failure into the library error for `path`.
fn open_error(path: &Path, failure: OpenFailure) -> Pdf2PngError {
    let path = path.to_path_buf();
    match failure {
        OpenFailure::NotFound => Pdf2PngError::FileNotFound { path },
        OpenFailure::PermissionDenied => Pdf2PngError::PermissionDenied { path },
        OpenFailure::InvalidFormat(detail) => Pdf2PngError::CorruptPdf { path, detail },
        OpenFailure::PasswordRequired => Pdf2PngError::PasswordRequired { path },
        OpenFailure::WrongPassword => Pdf2PngError::WrongPassword { path },
        OpenFailure::Other(detail) => Pdf2PngError::OpenFailed { path, detail },
    }
}

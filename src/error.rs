//! Error types for the edgequake-pdf2png library.
//!
//! Every failure is fatal for the conversion it occurs in: a batch stops at
//! the first page that cannot be rendered or written, and files already
//! written for earlier pages are left in place.
//!
//! Variants are grouped into coarse [`ErrorClass`]es so callers (and the CLI's
//! exit codes) can react to the kind of failure without matching on every
//! variant.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2png library.
#[derive(Debug, Error)]
pub enum Pdf2PngError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium must be available before any page can be rendered. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or its directory).\n\
  • Place libpdfium next to the pdf2png executable.\n\
  • Build with `--features bundled` and PDFIUM_BUNDLE_LIB set.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Open errors ───────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The engine could not open the file for another reason.
    #[error("Error opening '{path}': {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The file exists and was read, but does not start with a PDF header.
    #[error("'{path}' is not a valid PDF file\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("'{path}' is not a valid PDF file: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The document opened but contains no pages.
    #[error("'{path}' is an empty document (0 pages); nothing to convert")]
    EmptyDocument { path: PathBuf },

    /// A page could not be rasterised, encoded, or written.
    ///
    /// `page_index` is 0-based; the message shows the 1-based page number.
    #[error("Page {} failed: {detail}\nConversion stopped; earlier pages were kept.", .page_index + 1)]
    PageRenderFailed { page_index: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse grouping of [`Pdf2PngError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rendering capability unavailable.
    Setup,
    /// Input unreadable, missing, or locked.
    Open,
    /// Input is not a well-formed PDF.
    InvalidDocument,
    /// Input has zero pages.
    EmptyDocument,
    /// A page failed to render or write.
    PageRender,
    /// Output directory could not be created.
    Directory,
    /// Invalid caller-supplied configuration.
    Config,
}

impl Pdf2PngError {
    /// The class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Pdf2PngError::PdfiumBindingFailed(_) => ErrorClass::Setup,
            Pdf2PngError::FileNotFound { .. }
            | Pdf2PngError::PermissionDenied { .. }
            | Pdf2PngError::PasswordRequired { .. }
            | Pdf2PngError::WrongPassword { .. }
            | Pdf2PngError::OpenFailed { .. } => ErrorClass::Open,
            Pdf2PngError::NotAPdf { .. } | Pdf2PngError::CorruptPdf { .. } => {
                ErrorClass::InvalidDocument
            }
            Pdf2PngError::EmptyDocument { .. } => ErrorClass::EmptyDocument,
            Pdf2PngError::PageRenderFailed { .. } => ErrorClass::PageRender,
            Pdf2PngError::OutputDirFailed { .. } => ErrorClass::Directory,
            Pdf2PngError::InvalidConfig(_) => ErrorClass::Config,
        }
    }
}

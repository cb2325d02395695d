//! # edgequake-pdf2png
//!
//! Rasterise every page of a PDF into its own PNG file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   check the path exists, is readable, starts with %PDF
//!  ├─ 2. Output  create the output directory (and parents)
//!  ├─ 3. Open    load the document through pdfium; reject 0-page PDFs
//!  ├─ 4. Render  each page at dpi/72 scale, strictly in page order
//!  ├─ 5. Encode  PNG in memory
//!  └─ 6. Write   output_dir/page_0001.png, page_0002.png, …
//! ```
//!
//! A page that fails to render or write stops the batch; see
//! [`Pdf2PngError::PageRenderFailed`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2png::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(150).build()?;
//!     let output = convert("document.pdf", "pages/", &config)?;
//!     println!("{} images in {}", output.page_count(), output.output_dir.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `bundled` | off     | Embeds the pdfium library in the binary at build time |
//!
//! ## Locating pdfium
//!
//! pdfium is found at startup by `pdfium-locate`: `PDFIUM_LIB_PATH`, then a
//! bundled copy, then the executable's directory, then the system library
//! path. Nothing is downloaded at runtime.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, BASE_DPI, DEFAULT_DPI};
pub use convert::{convert, convert_with_engine, inspect, inspect_with_engine};
pub use engine::{Document, OpenFailure, Page, RenderEngine};
pub use error::{ErrorClass, Pdf2PngError};
pub use output::{ConversionOutput, DocumentMetadata, OutputFile, PageSize};
pub use pipeline::render::{PdfiumEngine, RenderRequest};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};

//! Pipeline stages for PDF-to-PNG conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the rendering backend can change without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ write
//! (path)    (pdfium)   (PNG)      (page_NNNN.png)
//! ```
//!
//! 1. [`input`] : check the input path exists, is readable, and is a PDF
//! 2. [`render`]: scale math and the pdfium-backed engine
//! 3. [`encode`]: PNG-encode each `DynamicImage` in memory
//! 4. [`write`] : create the output directory and place numbered files

pub mod encode;
pub mod input;
pub mod render;
pub mod write;

//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// One PNG written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Full path of the written file.
    pub path: PathBuf,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Size of the encoded PNG in bytes.
    pub bytes: u64,
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub dpi: u32,
    /// One entry per page, in document order.
    pub files: Vec<OutputFile>,
    pub duration_ms: u64,
}

impl ConversionOutput {
    /// Number of images written.
    pub fn page_count(&self) -> usize {
        self.files.len()
    }
}

/// Information about a PDF, gathered without rendering any page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    /// Size of every page, in document order.
    pub page_sizes: Vec<PageSize>,
    pub pdf_version: String,
}

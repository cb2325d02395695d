//! The rendering capability the converter is written against.
//!
//! The converter never talks to pdfium directly. It opens a [`Document`]
//! through a [`RenderEngine`], asks it for a page count, and renders
//! [`Page`]s one at a time. [`crate::pipeline::render::PdfiumEngine`] is the
//! production implementation; any other engine that can answer the same
//! questions can be substituted (the integration tests use an in-memory one).
//!
//! The document handle is a boxed trait object owned by the caller, so it is
//! closed exactly once, when it is dropped, on every exit path.

use crate::output::{DocumentMetadata, PageSize};
use crate::pipeline::render::RenderRequest;
use image::DynamicImage;
use std::fmt;
use std::path::Path;

/// Why an engine could not open a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenFailure {
    /// Nothing at the path.
    NotFound,
    /// The file exists but cannot be read.
    PermissionDenied,
    /// The bytes are not a parseable PDF.
    InvalidFormat(String),
    /// The document is encrypted and no password was given.
    PasswordRequired,
    /// The document is encrypted and the given password is wrong.
    WrongPassword,
    /// Anything else.
    Other(String),
}

impl fmt::Display for OpenFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenFailure::NotFound => f.write_str("file not found"),
            OpenFailure::PermissionDenied => f.write_str("permission denied"),
            OpenFailure::InvalidFormat(d) => write!(f, "invalid PDF: {d}"),
            OpenFailure::PasswordRequired => f.write_str("password required"),
            OpenFailure::WrongPassword => f.write_str("wrong password"),
            OpenFailure::Other(d) => f.write_str(d),
        }
    }
}

/// An open PDF document.
pub trait Document {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Size of the page at `index` (0-based), in points.
    fn page_size(&self, index: usize) -> Result<PageSize, String>;

    /// Rasterise the page described by `request`.
    fn render_page(&self, request: &RenderRequest) -> Result<DynamicImage, String>;

    /// Document information. Engines that can read the info dictionary
    /// override this; the default only reports page geometry.
    fn metadata(&self) -> DocumentMetadata {
        let page_count = self.page_count();
        DocumentMetadata {
            page_count,
            page_sizes: (0..page_count)
                .filter_map(|i| self.page_size(i).ok())
                .collect(),
            ..DocumentMetadata::default()
        }
    }
}

/// Something that can open PDF documents.
pub trait RenderEngine {
    /// Open the document at `path`. The returned handle borrows the engine.
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn Document + 'a>, OpenFailure>;
}

/// A read-only view of one page. Only valid while its document is open.
#[derive(Clone, Copy)]
pub struct Page<'doc> {
    document: &'doc dyn Document,
    index: usize,
}

impl<'doc> Page<'doc> {
    /// 0-based index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Rasterise this page at `dpi`.
    pub fn render(&self, dpi: u32) -> Result<DynamicImage, String> {
        self.document
            .render_page(&RenderRequest::new(self.index, dpi))
    }
}

/// Every page of `document`, in order.
pub fn pages(document: &dyn Document) -> impl Iterator<Item = Page<'_>> {
    (0..document.page_count()).map(move |index| Page { document, index })
}

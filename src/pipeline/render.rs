//! PDF rasterisation via pdfium.
//!
//! [`RenderRequest`] holds the page-to-bitmap transform (a uniform
//! `dpi / 72` scale) and [`PdfiumEngine`] implements
//! [`crate::engine::RenderEngine`] on top of `pdfium-render`.
//!
//! Rendering is synchronous. pdfium keeps per-document state that must not
//! be touched from two threads at once, and pages are produced strictly in
//! order, so there is nothing to gain from a worker pool here.

use crate::config::BASE_DPI;
use crate::engine::{Document, OpenFailure, RenderEngine};
use crate::error::Pdf2PngError;
use crate::output::{DocumentMetadata, PageSize};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Which page to render and how much to scale it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// 0-based page index.
    pub page_index: usize,
    /// Uniform scale applied to both axes, `dpi / 72`.
    pub scale: f32,
}

impl RenderRequest {
    pub fn new(page_index: usize, dpi: u32) -> Self {
        Self {
            page_index,
            scale: dpi as f32 / BASE_DPI,
        }
    }

    /// Bitmap size for a page of `size` points, rounded to the nearest pixel.
    ///
    /// Never returns a zero dimension.
    pub fn pixel_size(&self, size: PageSize) -> (u32, u32) {
        let scale = f64::from(self.scale);
        let px = |points: f32| (f64::from(points) * scale).round().max(1.0) as u32;
        (px(size.width), px(size.height))
    }
}

/// [`RenderEngine`] backed by a bound pdfium library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    /// Locate and bind pdfium (see `pdfium_locate::bind_pdfium`).
    ///
    /// Fails fast with [`Pdf2PngError::PdfiumBindingFailed`] when no usable
    /// library is found.
    pub fn new() -> Result<Self, Pdf2PngError> {
        let bound = pdfium_locate::bind_pdfium()
            .map_err(|e| Pdf2PngError::PdfiumBindingFailed(e.to_string()))?;
        info!("PDFium bound from {}", bound.source);
        Ok(Self::from_pdfium(bound.pdfium))
    }

    /// Wrap an already bound pdfium instance.
    pub fn from_pdfium(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }
}

impl RenderEngine for PdfiumEngine {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn Document + 'a>, OpenFailure> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| classify_open_error(e, password.is_some()))?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// Map a pdfium load error onto the engine-neutral [`OpenFailure`].
fn classify_open_error(err: PdfiumError, had_password: bool) -> OpenFailure {
    match err {
        PdfiumError::PdfiumLibraryInternalError(internal) => match internal {
            PdfiumInternalError::FileError => OpenFailure::NotFound,
            PdfiumInternalError::FormatError => OpenFailure::InvalidFormat(format!("{internal:?}")),
            PdfiumInternalError::PasswordError if had_password => OpenFailure::WrongPassword,
            PdfiumInternalError::PasswordError => OpenFailure::PasswordRequired,
            other => OpenFailure::Other(format!("{other:?}")),
        },
        PdfiumError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            OpenFailure::PermissionDenied
        }
        PdfiumError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
            OpenFailure::NotFound
        }
        other => OpenFailure::Other(format!("{other:?}")),
    }
}

/// pdfium takes signed bitmap dimensions.
fn render_target(width: u32, height: u32) -> Result<(i32, i32), String> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(format!(
            "bitmap of {width}x{height} px exceeds the renderer's limit of {} px per side",
            i32::MAX
        )),
    }
}

/// An open pdfium document. Closed when dropped.
struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumDocument<'_> {
    fn page(&self, index: usize) -> Result<PdfPage<'_>, String> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| format!("{e:?}"))
    }
}

fn size_of(page: &PdfPage<'_>) -> PageSize {
    PageSize {
        width: page.width().value,
        height: page.height().value,
    }
}

impl Document for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, String> {
        self.page(index).map(|p| size_of(&p))
    }

    fn render_page(&self, request: &RenderRequest) -> Result<DynamicImage, String> {
        let page = self.page(request.page_index)?;
        let (width, height) = request.pixel_size(size_of(&page));
        let (target_width, target_height) = render_target(width, height)?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_width)
            .set_target_height(target_height);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| format!("{e:?}"))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            request.page_index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        let page_count = self.page_count();
        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count,
            page_sizes: (0..page_count)
                .filter_map(|i| self.page_size(i).ok())
                .collect(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}

//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as each page is rendered and written.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2png::{ConversionProgressCallback, ConversionConfig, OutputFile};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, file: &OutputFile) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} → {}", page_num, total_pages, file.path.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::OutputFile;
use std::sync::Arc;

/// Called by the converter as it processes each page.
///
/// Pages are processed one at a time in document order, so events for a
/// single conversion never overlap. The trait is still `Send + Sync` so one
/// callback can be shared by conversions running on different threads.
/// All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the document is opened and before any page is rendered.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rendered.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page's PNG has been written.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, file: &OutputFile) {
        let _ = (page_num, total_pages, file);
    }

    /// Called when a page fails. The conversion stops right after this event.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been written.
    ///
    /// Not called when the conversion aborts.
    fn on_conversion_complete(&self, total_pages: usize, files_written: usize) {
        let _ = (total_pages, files_written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

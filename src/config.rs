//! Configuration types for PDF-to-PNG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The input path and the output
//! directory are arguments of [`crate::convert::convert`], not configuration:
//! one config is meant to be reused across many documents.

use crate::error::Pdf2PngError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Output resolution used when none is configured.
pub const DEFAULT_DPI: u32 = 300;

/// PDF user-space resolution: one point is 1/72 inch.
pub const BASE_DPI: f32 = 72.0;

/// Configuration for a PDF-to-PNG conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf2png::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI. Must be ≥ 1. Default: 300.
    ///
    /// Each page is scaled by `dpi / 72` on both axes, so 72 DPI yields one
    /// pixel per point and 300 DPI a print-quality raster.
    pub dpi: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PngError> {
        if self.config.dpi == 0 {
            return Err(Pdf2PngError::InvalidConfig(
                "DPI must be a positive integer, got 0".into(),
            ));
        }
        Ok(self.config)
    }
}

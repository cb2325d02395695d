//! # pdfium-locate
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library at
//! process start and bind `pdfium-render` to it, failing fast with a clear
//! message when none is usable. Nothing is downloaded or installed at
//! runtime: the library is either shipped next to the binary, installed on
//! the system, named explicitly, or embedded at build time.
//!
//! ## Search order
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one.
//!    When set, it is the only candidate; a missing path is an error.
//! 2. The library embedded at build time (`bundled` feature), extracted once
//!    into [`pdfium_cache_dir`].
//! 3. The directory containing the running executable.
//! 4. The platform's default library search path.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::bind_pdfium;
//!
//! let bound = bind_pdfium().expect("PDFium unavailable");
//! println!("PDFium loaded from {}", bound.source);
//! let _pdfium = bound.pdfium;
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH`: path to an existing pdfium library (or its directory).
//! - `PDFIUM_LOCATE_CACHE_DIR`: where the bundled library is extracted.

use std::fmt;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming an explicit pdfium library (file or directory).
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the extraction directory of the bundled library.
pub const CACHE_DIR_ENV: &str = "PDFIUM_LOCATE_CACHE_DIR";

#[cfg(feature = "bundled")]
mod bundled {
    include!(concat!(env!("OUT_DIR"), "/bundled.rs"));
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pdfium-locate operations.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// `PDFIUM_LIB_PATH` is set but nothing exists there.
    #[error("{LIB_PATH_ENV} points to '{path}', which does not exist")]
    EnvPathMissing { path: PathBuf },

    /// Could not create the cache directory or write the bundled library.
    #[error("Failed to extract bundled PDFium to '{path}': {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A specific library file was found but would not load.
    #[error("Failed to bind PDFium from {source_desc}: {reason}")]
    Bind { source_desc: String, reason: String },

    /// Every candidate was tried and none could be bound.
    #[error("No usable PDFium library found. Tried:\n{}", format_attempts(.attempts))]
    NotFound { attempts: Vec<String> },
}

fn format_attempts(attempts: &[String]) -> String {
    attempts
        .iter()
        .map(|a| format!("  • {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Library sources ──────────────────────────────────────────────────────────

/// Where a bound PDFium library came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibrarySource {
    /// Named by `PDFIUM_LIB_PATH`.
    EnvOverride(PathBuf),
    /// Embedded at build time and extracted to the cache directory.
    Bundled(PathBuf),
    /// Shipped in the same directory as the executable.
    BesideExecutable(PathBuf),
    /// Resolved by the platform loader's default search path.
    System,
}

impl fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySource::EnvOverride(p) => write!(f, "{LIB_PATH_ENV} ({})", p.display()),
            LibrarySource::Bundled(p) => write!(f, "bundled copy ({})", p.display()),
            LibrarySource::BesideExecutable(p) => write!(f, "executable directory ({})", p.display()),
            LibrarySource::System => f.write_str("system library path"),
        }
    }
}

/// A bound PDFium instance together with the source it was loaded from.
pub struct BoundPdfium {
    pub pdfium: Pdfium,
    pub source: LibrarySource,
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Platform file name of the pdfium shared library, e.g. `libpdfium.so`.
pub fn library_file_name() -> PathBuf {
    PathBuf::from(Pdfium::pdfium_platform_library_name())
}

/// Directory the bundled library is extracted into.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2png/pdfium-bundled-{VERSION}/`
/// - **Linux**: `~/.cache/pdf2png/pdfium-bundled-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2png\pdfium-bundled-{VERSION}\`
///
/// Override by setting `PDFIUM_LOCATE_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    cache_dir_with_override(std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from))
}

fn cache_dir_with_override(override_dir: Option<PathBuf>) -> PathBuf {
    let leaf = format!("pdfium-bundled-{}", env!("CARGO_PKG_VERSION"));

    if let Some(dir) = override_dir {
        return dir.join(leaf);
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2png").join(leaf)
}

/// Resolve the value of `PDFIUM_LIB_PATH` to a library file.
///
/// A directory is joined with [`library_file_name`].
pub fn resolve_env_override(value: &str) -> Result<PathBuf, PdfiumLocateError> {
    let path = PathBuf::from(value);
    let path = if path.is_dir() {
        path.join(library_file_name())
    } else {
        path
    };

    if path.exists() {
        Ok(path)
    } else {
        Err(PdfiumLocateError::EnvPathMissing { path })
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Lists the places PDFium will be loaded from, in priority order.
///
/// Extracts the bundled library as a side effect when the `bundled` feature
/// is active.
pub fn candidate_sources() -> Result<Vec<LibrarySource>, PdfiumLocateError> {
    if let Ok(value) = std::env::var(LIB_PATH_ENV) {
        if !value.is_empty() {
            return Ok(vec![LibrarySource::EnvOverride(resolve_env_override(
                &value,
            )?)]);
        }
    }

    let mut sources = Vec::with_capacity(3);

    #[cfg(feature = "bundled")]
    sources.push(LibrarySource::Bundled(ensure_pdfium_bundled()?));

    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let candidate = dir.join(library_file_name());
        if candidate.exists() {
            sources.push(LibrarySource::BesideExecutable(candidate));
        }
    }

    sources.push(LibrarySource::System);
    Ok(sources)
}

/// Binds to the first PDFium library that loads.
///
/// When `PDFIUM_LIB_PATH` is set only that library is tried, so a broken
/// override is reported instead of silently falling back.
pub fn bind_pdfium() -> Result<BoundPdfium, PdfiumLocateError> {
    let sources = candidate_sources()?;
    let explicit = matches!(sources.as_slice(), [LibrarySource::EnvOverride(_)]);
    let mut attempts = Vec::with_capacity(sources.len());

    for source in sources {
        let bound = match &source {
            LibrarySource::EnvOverride(p)
            | LibrarySource::Bundled(p)
            | LibrarySource::BesideExecutable(p) => Pdfium::bind_to_library(p),
            LibrarySource::System => Pdfium::bind_to_system_library(),
        };

        match bound {
            Ok(bindings) => {
                return Ok(BoundPdfium {
                    pdfium: Pdfium::new(bindings),
                    source,
                })
            }
            Err(e) if explicit => {
                return Err(PdfiumLocateError::Bind {
                    source_desc: source.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => attempts.push(format!("{source}: {e}")),
        }
    }

    Err(PdfiumLocateError::NotFound { attempts })
}

/// Writes the embedded library into [`pdfium_cache_dir`] unless an identical
/// copy is already there, and returns its path.
#[cfg(feature = "bundled")]
pub fn ensure_pdfium_bundled() -> Result<PathBuf, PdfiumLocateError> {
    let dest = pdfium_cache_dir().join(library_file_name());
    write_if_stale(&dest, bundled::PDFIUM_BYTES)?;
    Ok(dest)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Writes `bytes` to `dest` through a temp file + rename, skipping the write
/// when `dest` already holds exactly these bytes.
#[cfg(any(feature = "bundled", test))]
fn write_if_stale(dest: &Path, bytes: &[u8]) -> Result<bool, PdfiumLocateError> {
    let extract_err = |source| PdfiumLocateError::Extract {
        path: dest.to_path_buf(),
        source,
    };

    // Length first, so a stale copy of a different size is never read back.
    let same_len = std::fs::metadata(dest).is_ok_and(|m| m.len() == bytes.len() as u64);
    if same_len && std::fs::read(dest).is_ok_and(|existing| existing == bytes) {
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(extract_err)?;
    }

    // A per-process temp name keeps two first runs from clobbering each other.
    let tmp = dest.with_extension(format!("tmp{}", std::process::id()));
    std::fs::write(&tmp, bytes).map_err(extract_err)?;
    std::fs::rename(&tmp, dest).map_err(extract_err)?;
    Ok(true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

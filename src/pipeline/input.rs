//! Input resolution: check a user-supplied path before anything is created.
//!
//! Resolution runs before the output directory is touched, so a missing or
//! unreadable input never leaves an empty directory behind. A file with no
//! `%PDF` marker in its header window is reported as not a PDF; anything
//! else is left for the engine to parse.

use crate::error::Pdf2PngError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker that opens every PDF header.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// How far into the file the header may start. Readers (pdfium included)
/// tolerate leading junk such as a BOM or blank lines before `%PDF`.
pub const HEADER_SEARCH_LEN: usize = 1024;

/// Validate that `path` exists, is readable, and looks like a PDF.
pub fn resolve_input(path: &Path) -> Result<PathBuf, Pdf2PngError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Pdf2PngError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Pdf2PngError::OpenFailed {
            path,
            detail: "is a directory".into(),
        });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2PngError::PermissionDenied { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Pdf2PngError::FileNotFound { path });
        }
        Err(e) => {
            return Err(Pdf2PngError::OpenFailed {
                path,
                detail: e.to_string(),
            });
        }
    };

    let header = read_header(&mut file).map_err(|e| Pdf2PngError::OpenFailed {
        path: path.clone(),
        detail: e.to_string(),
    })?;
    if !header.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        let mut magic = [0u8; 4];
        let n = header.len().min(magic.len());
        magic[..n].copy_from_slice(&header[..n]);
        return Err(Pdf2PngError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Read up to [`HEADER_SEARCH_LEN`] leading bytes.
fn read_header(reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_SEARCH_LEN);
    reader
        .take(HEADER_SEARCH_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(header)
}

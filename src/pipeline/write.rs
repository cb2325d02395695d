//! Output layout: the directory and the `page_NNNN.png` files inside it.

use crate::error::Pdf2PngError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create `dir` (and any missing parents). An existing directory is fine.
pub fn prepare_output_dir(dir: &Path) -> Result<(), Pdf2PngError> {
    std::fs::create_dir_all(dir).map_err(|e| Pdf2PngError::OutputDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    debug!("Output directory ready: {}", dir.display());
    Ok(())
}

/// File name for a 1-indexed page: `page_0001.png`, `page_0002.png`, …
pub fn page_file_name(page_num: usize) -> String {
    format!("page_{page_num:04}.png")
}

/// Write an encoded page into `dir` and return its path.
///
/// Bytes go to a `.tmp` sibling first and are renamed into place, so a
/// failed write never leaves a truncated file under the final name.
pub fn write_page(dir: &Path, page_num: usize, png: &[u8]) -> std::io::Result<PathBuf> {
    let name = page_file_name(page_num);
    let path = dir.join(&name);
    let tmp_path = dir.join(format!("{name}.tmp"));

    let placed = std::fs::write(&tmp_path, png).and_then(|()| std::fs::rename(&tmp_path, &path));
    if let Err(e) = placed {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(path)
}

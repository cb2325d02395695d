// Build script for pdfium-locate
//
// Handles the optional `bundled` feature: when active, places the platform
// pdfium shared library (pointed to by `PDFIUM_BUNDLE_LIB`) in Cargo's output
// directory and generates a tiny Rust source file that embeds the bytes with
// `include_bytes!`.
//
// `PDFIUM_BUNDLE_LIB` may name the library directly or a pdfium-binaries
// `.tgz` archive, in which case the library entry for the target OS is
// extracted from it.

use std::fs::File;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-env-changed=PDFIUM_BUNDLE_LIB");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_BUNDLED");

    if std::env::var("CARGO_FEATURE_BUNDLED").is_err() {
        return;
    }

    // ── Locate the source library ─────────────────────────────────────────
    let lib_src = match std::env::var("PDFIUM_BUNDLE_LIB") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => {
            panic!(
                "\n\
                 ┌─────────────────────────────────────────────────────────┐\n\
                 │  pdfium-locate: `bundled` feature activated but         │\n\
                 │  `PDFIUM_BUNDLE_LIB` is not set.                        │\n\
                 │                                                         │\n\
                 │  Set it to the platform pdfium shared library, or to    │\n\
                 │  a pdfium-binaries release archive (.tgz):              │\n\
                 │                                                         │\n\
                 │  macOS : path/to/libpdfium.dylib                        │\n\
                 │  Linux : path/to/libpdfium.so                           │\n\
                 │  Windows: path\\to\\pdfium.dll                            │\n\
                 │  any   : path/to/pdfium-linux-x64.tgz                   │\n\
                 │                                                         │\n\
                 │  Pre-built libraries are available from:                │\n\
                 │  https://github.com/bblanchon/pdfium-binaries/releases  │\n\
                 └─────────────────────────────────────────────────────────┘\n"
            )
        }
    };

    if !lib_src.exists() {
        panic!(
            "pdfium-locate: PDFIUM_BUNDLE_LIB points to a file that does not exist: {}",
            lib_src.display()
        );
    }
    println!("cargo:rerun-if-changed={}", lib_src.display());

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR not set"));
    let lib_dest = out_dir.join("bundled_pdfium_lib");

    if is_archive(&lib_src) {
        let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
        extract_from_archive(&lib_src, archive_entry_for(&target_os), &lib_dest);
    } else {
        std::fs::copy(&lib_src, &lib_dest).unwrap_or_else(|e| {
            panic!(
                "pdfium-locate: failed to copy {} → {}: {}",
                lib_src.display(),
                lib_dest.display(),
                e
            )
        });
    }

    // ── Generate bundled.rs ───────────────────────────────────────────────
    // `include_bytes!` needs a literal path, so the invocation lives in a
    // generated file pulled in with `include!()`.
    let bundled_rs = out_dir.join("bundled.rs");
    let code = r#"
/// The pdfium shared library embedded at compile time.
///
/// Written to the local cache directory on first use
/// (see [`super::ensure_pdfium_bundled`]).
pub static PDFIUM_BYTES: &[u8] = include_bytes!("bundled_pdfium_lib");
"#;
    std::fs::write(&bundled_rs, code).unwrap_or_else(|e| {
        panic!(
            "pdfium-locate: failed to write {}: {}",
            bundled_rs.display(),
            e
        )
    });
}

fn is_archive(path: &Path) -> bool {
    let name = path.to_string_lossy().to_lowercase();
    name.ends_with(".tgz") || name.ends_with(".tar.gz")
}

/// Path of the shared library inside a pdfium-binaries archive.
fn archive_entry_for(target_os: &str) -> &'static str {
    match target_os {
        "macos" => "lib/libpdfium.dylib",
        "windows" => "bin/pdfium.dll",
        _ => "lib/libpdfium.so",
    }
}

fn extract_from_archive(archive_path: &Path, entry_name: &str, dest: &Path) {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let file = File::open(archive_path).unwrap_or_else(|e| {
        panic!(
            "pdfium-locate: cannot open {}: {}",
            archive_path.display(),
            e
        )
    });
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive
        .entries()
        .unwrap_or_else(|e| panic!("pdfium-locate: unreadable archive: {e}"));

    for entry in entries {
        let mut entry = entry.unwrap_or_else(|e| panic!("pdfium-locate: bad archive entry: {e}"));
        let matches = entry
            .path()
            .map(|p| p.to_string_lossy() == entry_name)
            .unwrap_or(false);
        if matches {
            entry
                .unpack(dest)
                .unwrap_or_else(|e| panic!("pdfium-locate: unpack of {entry_name} failed: {e}"));
            return;
        }
    }

    panic!(
        "pdfium-locate: '{}' not found in {}",
        entry_name,
        archive_path.display()
    );
}

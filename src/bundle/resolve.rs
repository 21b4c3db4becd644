//! Relative import resolution.

use std::path::{Path, PathBuf};

use super::BundleError;

const EXTENSIONS: &[&str] = &["js", "mjs"];

/// Whether `specifier` names a file rather than a package.
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Resolve `specifier` imported from `importer` to a canonical file path.
///
/// Tries the path as written, then with each known extension, then as a
/// directory with an index file. Leading `/` is relative to `root`.
pub fn resolve(
    specifier: &str,
    importer: &Path,
    root: &Path,
    display: &str,
) -> Result<PathBuf, BundleError> {
    if !is_relative(specifier) {
        return Err(BundleError::Bare {
            specifier: specifier.to_string(),
            importer: display.to_string(),
        });
    }

    let base = match specifier.strip_prefix('/') {
        Some(rest) => root.join(rest),
        None => importer
            .parent()
            .map(|dir| dir.join(specifier))
            .unwrap_or_else(|| PathBuf::from(specifier)),
    };

    candidates(&base)
        .into_iter()
        .find(|candidate| candidate.is_file())
        .and_then(|found| found.canonicalize().ok())
        .ok_or_else(|| BundleError::Unresolved {
            specifier: specifier.to_string(),
            importer: display.to_string(),
        })
}

fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];
    let raw = base.as_os_str().to_string_lossy();
    out.extend(EXTENSIONS.iter().map(|ext| PathBuf::from(format!("{raw}.{ext}"))));
    out.extend(EXTENSIONS.iter().map(|ext| base.join(format!("index.{ext}"))));
    out
}

//! URL to output path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL below `root`. Directories map to their
/// `index.html`; anything escaping `root` is rejected.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|seg| seg == "..") {
        return None;
    }

    let canonical = root.join(&clean).canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Decode, drop query and fragment, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("blog/index.html"), "blog").unwrap();
        fs::write(dir.path().join("css/main file.css"), "").unwrap();
        dir
    }

    #[test]
    fn test_index_resolution() {
        let dir = site();
        let root = dir.path();
        let index = resolve_path("/", root).unwrap();
        assert_eq!(fs::read_to_string(index).unwrap(), "home");
        let blog = resolve_path("/blog/?x=1", root).unwrap();
        assert_eq!(fs::read_to_string(blog).unwrap(), "blog");
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        assert!(resolve_path("/css/main%20file.css", dir.path()).is_some());
    }

    #[test]
    fn test_rejects_traversal_and_missing() {
        let dir = site();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/%2e%2e/secret", dir.path()).is_none());
        assert!(resolve_path("/missing.html", dir.path()).is_none());
        assert!(resolve_path("/css/", dir.path()).is_none());
    }
}

//! Source globs: matching and collection relative to the project root.
//!
//! Each pattern has a literal base directory (the components before the
//! first wildcard). Files are collected by walking only those bases, and
//! every match carries its path relative to the base of the pattern that
//! matched it, which is the layout preserved in the output directory.
//!
//! ```text
//! src/img/**/*.{jpg,png}     base: src/img
//! src/img/icons/a.png        rel:  icons/a.png
//! ```

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;
use std::path::{Component, Path, PathBuf};

/// A file selected by a [`SourceGlob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the matching pattern's base directory.
    pub rel: PathBuf,
}

/// A compiled set of root-relative glob patterns.
#[derive(Debug, Clone)]
pub struct SourceGlob {
    set: GlobSet,
    bases: Vec<PathBuf>,
}

impl SourceGlob {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        let mut bases = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            builder.add(compile(pattern)?);
            bases.push(literal_base(pattern));
        }
        Ok(Self {
            set: builder.build()?,
            bases,
        })
    }

    /// Convenience for single-pattern config keys.
    pub fn single(pattern: &str) -> Result<Self, globset::Error> {
        Self::new(&[pattern])
    }

    /// Literal base directories, nested ones dropped.
    pub fn bases(&self) -> Vec<PathBuf> {
        dedup_bases(&self.bases)
    }

    /// Whether a root-relative path matches any pattern.
    pub fn is_match(&self, rel: &Path) -> bool {
        self.set.is_match(rel)
    }

    /// Collect matching files under `root`, sorted by path.
    pub fn collect(&self, root: &Path) -> Vec<SourceFile> {
        let mut found: Vec<SourceFile> = Vec::new();

        for base in dedup_bases(&self.bases) {
            let dir = root.join(&base);
            if dir.is_file() {
                self.push_match(root, dir, &mut found);
                continue;
            }
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir)
                .sort(true)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                self.push_match(root, entry.path(), &mut found);
            }
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        found.dedup_by(|a, b| a.path == b.path);
        found
    }

    fn push_match(&self, root: &Path, path: PathBuf, found: &mut Vec<SourceFile>) {
        let Ok(rel_root) = path.strip_prefix(root) else {
            return;
        };
        // The first matching pattern decides the relative layout
        let Some(&index) = self.set.matches(rel_root).first() else {
            return;
        };
        let rel = rel_root
            .strip_prefix(&self.bases[index])
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| rel_root.to_path_buf());
        let rel = if rel.as_os_str().is_empty() {
            PathBuf::from(rel_root.file_name().unwrap_or_default())
        } else {
            rel
        };
        found.push(SourceFile { path, rel });
    }
}

fn compile(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Leading path components free of glob metacharacters.
fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();
    let last = components.len().saturating_sub(1);
    for (i, component) in components.iter().enumerate() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            break;
        }
        // A fully literal pattern names a file; its base is the parent
        if i == last {
            break;
        }
        base.push(component);
    }
    base
}

/// Drop bases nested inside another base to avoid walking twice.
fn dedup_bases(bases: &[PathBuf]) -> Vec<PathBuf> {
    let mut sorted: Vec<&PathBuf> = bases.iter().collect();
    sorted.sort();
    let mut result: Vec<PathBuf> = Vec::new();
    for base in sorted {
        if !result.iter().any(|kept| base.starts_with(kept)) {
            result.push(base.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_literal_base() {
        assert_eq!(literal_base("src/img/**/*.png"), PathBuf::from("src/img"));
        assert_eq!(literal_base("src/sass/main.{sass,scss}"), PathBuf::from("src/sass"));
        assert_eq!(literal_base("src/js/index.js"), PathBuf::from("src/js"));
        assert_eq!(literal_base("**/*.html"), PathBuf::new());
    }

    #[test]
    fn test_bases_dedup() {
        let glob = SourceGlob::new(&["src/img/**/*.png", "src/img/svg/*.svg", "src/js/a.js"]).unwrap();
        assert_eq!(glob.bases(), vec![PathBuf::from("src/img"), PathBuf::from("src/js")]);
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let glob = SourceGlob::single("src/html/pages/*.html").unwrap();
        assert!(glob.is_match(Path::new("src/html/pages/index.html")));
        assert!(!glob.is_match(Path::new("src/html/pages/blog/post.html")));
    }

    #[test]
    fn test_alternation() {
        let glob = SourceGlob::single("src/sass/main.{sass,scss}").unwrap();
        assert!(glob.is_match(Path::new("src/sass/main.scss")));
        assert!(glob.is_match(Path::new("src/sass/main.sass")));
        assert!(!glob.is_match(Path::new("src/sass/main.css")));
    }

    #[test]
    fn test_collect_relative_layout() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/img/a.png");
        touch(dir.path(), "src/img/sub/b.jpg");
        touch(dir.path(), "src/img/svg/c.svg");

        let glob = SourceGlob::single("src/img/**/*.{jpg,jpeg,png}").unwrap();
        let files = glob.collect(dir.path());
        let rels: Vec<_> = files.iter().map(|f| f.rel.clone()).collect();
        assert_eq!(rels, vec![PathBuf::from("a.png"), PathBuf::from("sub/b.jpg")]);
    }

    #[test]
    fn test_collect_multiple_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/sass/main.scss");
        touch(dir.path(), "src/sass/second.sass");
        touch(dir.path(), "src/sass/_partial.scss");

        let glob =
            SourceGlob::new(&["src/sass/main.{sass,scss}", "src/sass/second.{sass,scss}"]).unwrap();
        let files = glob.collect(dir.path());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].rel, PathBuf::from("main.scss"));
    }

    #[test]
    fn test_collect_missing_base() {
        let dir = TempDir::new().unwrap();
        let glob = SourceGlob::single("src/fonts/**/*").unwrap();
        assert!(glob.collect(dir.path()).is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(SourceGlob::single("src/[").is_err());
    }
}

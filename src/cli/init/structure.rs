//! Source directory structure creation.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Create `folders` under `root`, returning the ones that did not exist.
///
/// The root directory is created if it doesn't exist.
pub fn create_structure(root: &Path, folders: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create root directory '{}'", root.display()))?;
    }

    let mut created = Vec::new();
    for dir in folders {
        let path = root.join(dir);
        if path.is_dir() {
            continue;
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory '{}'", path.display()))?;
        created.push(path);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_create_structure() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let folders = Config::default().folders;

        let created = create_structure(&root, &folders).unwrap();

        assert_eq!(created.len(), folders.len());
        assert!(root.join("src/html/partials").is_dir());
        assert!(root.join("src/img/svg").is_dir());
        assert!(root.join("src/resources").is_dir());
    }

    #[test]
    fn test_create_structure_idempotent() {
        let temp = TempDir::new().unwrap();
        let folders = Config::default().folders;
        create_structure(temp.path(), &folders).unwrap();

        let marker = temp.path().join("src/sass/main.scss");
        fs::write(&marker, "body { color: red; }").unwrap();

        let created = create_structure(temp.path(), &folders).unwrap();
        assert!(created.is_empty());
        assert_eq!(fs::read_to_string(&marker).unwrap(), "body { color: red; }");
    }
}

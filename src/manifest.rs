//! Revision manifest: original asset names to content-hashed names.
//!
//! `<base>/manifest.json` is a flat JSON object with sorted keys:
//!
//! ```json
//! {
//!   "css/main.css": "css/main-3f2a9c01b4.css",
//!   "js/all.js": "js/all-9be1d04c2a.js"
//! }
//! ```
//!
//! Pipelines call [`record`] with the entries they produced. Records merge
//! into whatever is already on disk, so styles, scripts and sprite styles
//! all end up in one file. The HTML pipeline reads it with [`Manifest::load`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::utils::fs::write_file;

/// Serializes read-merge-write cycles across concurrent watch runs.
static MANIFEST_LOCK: Mutex<()> = Mutex::new(());

/// Parsed manifest contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Read the manifest at `path`. A missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
        };
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("invalid manifest {}", path.display()))?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    #[cfg(test)]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merge(&mut self, entries: &BTreeMap<String, String>) {
        for (original, hashed) in entries {
            self.entries.insert(original.clone(), hashed.clone());
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.entries)?;
        json.push('\n');
        write_file(path, json)
    }
}

/// Merge `entries` into the manifest at `path`.
pub fn record(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let _guard = MANIFEST_LOCK.lock();
    let mut manifest = Manifest::load(path)?;
    manifest.merge(entries);
    manifest.save(path)?;

    crate::debug!("manifest"; "recorded {} in {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn entry(k: &str, v: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(k.to_string(), v.to_string())])
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::load(&dir.path().join("manifest.json")).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_record_merges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        record(&path, &entry("css/main.css", "css/main-aaaaaaaaaa.css")).unwrap();
        record(&path, &entry("js/all.js", "js/all-bbbbbbbbbb.js")).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.entries().len(), 2);
        assert_eq!(manifest.get("js/all.js"), Some("js/all-bbbbbbbbbb.js"));
    }

    #[test]
    fn test_record_replaces_same_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        record(&path, &entry("css/main.css", "css/main-aaaaaaaaaa.css")).unwrap();
        record(&path, &entry("css/main.css", "css/main-cccccccccc.css")).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.get("css/main.css"), Some("css/main-cccccccccc.css"));
    }

    #[test]
    fn test_keys_sorted_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        record(&path, &entry("js/all.js", "js/all-1.js")).unwrap();
        record(&path, &entry("css/main.css", "css/main-1.css")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("css/main.css").unwrap() < text.find("js/all.js").unwrap());
    }

    #[test]
    fn test_concurrent_records_keep_all_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                thread::spawn(move || {
                    record(&path, &entry(&format!("css/{i}.css"), &format!("css/{i}-x.css")))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(Manifest::load(&path).unwrap().entries().len(), 8);
    }

    #[test]
    fn test_empty_record_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        record(&path, &BTreeMap::new()).unwrap();
        assert!(!path.exists());
    }
}

//! Content-hashed output names and reference rewriting.
//!
//! When the target hashes, `css/main.css` is written as
//! `css/main-3f2a9c01b4.css` and the pair is recorded for the manifest.
//! HTML output later swaps every recorded original for its hashed name.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::Target;
use crate::manifest::Manifest;
use crate::pipeline::PipelineReport;
use crate::utils::fs::write_file;
use crate::utils::hash::revisioned_name;

/// Write `data` as `dir/file_name`, hashed when the target asks for it.
///
/// Records the written path and any manifest entry on `report`.
pub fn emit(
    dir: &Path,
    file_name: &str,
    data: &[u8],
    target: &Target,
    report: &mut PipelineReport,
) -> Result<PathBuf> {
    let plain = dir.join(file_name);
    let out = if target.flags.hash {
        let hashed = dir.join(revisioned_name(file_name, data));
        report
            .manifest
            .insert(target.output_key(&plain), target.output_key(&hashed));
        hashed
    } else {
        plain
    };
    write_file(&out, data)?;
    report.wrote(out.clone());
    Ok(out)
}

/// Replace each manifest key in `text` with its hashed value.
///
/// Single left-to-right pass; at every position the longest matching key
/// wins, so `css/main.css` never clobbers part of `css/main.css.map`'s entry.
pub fn rewrite_references(text: &str, manifest: &Manifest) -> String {
    if manifest.is_empty() {
        return text.to_string();
    }
    let mut keys: Vec<(&str, &str)> = manifest
        .entries()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(ch) = rest.chars().next() {
        for (key, value) in &keys {
            if rest.starts_with(key) {
                out.push_str(value);
                rest = &rest[key.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::core::BuildMode;
    use crate::pipeline::Stage;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn manifest(pairs: &[(&str, &str)]) -> Manifest {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let entries: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        crate::manifest::record(&path, &entries).unwrap();
        Manifest::load(&path).unwrap()
    }

    #[test]
    fn test_rewrite_references() {
        let manifest = manifest(&[
            ("css/main.css", "css/main-aaaa.css"),
            ("js/all.js", "js/all-bbbb.js"),
        ]);
        let html = r#"<link href="css/main.css"><script src="js/all.js"></script>"#;
        assert_eq!(
            rewrite_references(html, &manifest),
            r#"<link href="css/main-aaaa.css"><script src="js/all-bbbb.js"></script>"#
        );
    }

    #[test]
    fn test_longest_key_wins() {
        let manifest = manifest(&[
            ("css/icons.css", "css/icons-1111.css"),
            ("css/icons.css.map", "css/icons-2222.css.map"),
        ]);
        assert_eq!(
            rewrite_references("css/icons.css.map css/icons.css", &manifest),
            "css/icons-2222.css.map css/icons-1111.css"
        );
    }

    #[test]
    fn test_no_manifest_no_change() {
        let dir = TempDir::new().unwrap();
        let empty = Manifest::load(&dir.path().join("manifest.json")).unwrap();
        assert_eq!(rewrite_references("css/main.css ✓", &empty), "css/main.css ✓");
    }

    #[test]
    fn test_emit_hashed_records_entry() {
        let dir = TempDir::new().unwrap();
        let target = Target::resolve(&test_config_at(dir.path(), ""), BuildMode::Production);
        let mut report = PipelineReport::new(Stage::Styles);

        let out = emit(&target.paths.css, "main.css", b"a{}", &target, &mut report).unwrap();
        let name = out.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("main-") && name.ends_with(".css"));
        assert!(out.exists());
        assert_eq!(report.manifest["css/main.css"], format!("css/{name}"));
        assert_eq!(report.written, vec![out]);
    }

    #[test]
    fn test_emit_plain_in_development() {
        let dir = TempDir::new().unwrap();
        let target = Target::resolve(&test_config_at(dir.path(), ""), BuildMode::Development);
        let mut report = PipelineReport::new(Stage::Scripts);

        let out = emit(&target.paths.js, "all.js", b"1", &target, &mut report).unwrap();
        assert!(out.ends_with("dev/js/all.js"));
        assert!(report.manifest.is_empty());
    }
}

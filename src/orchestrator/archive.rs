//! Zip the active output directory.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::core::Target;
use crate::utils::fs::collect_all_files;
use crate::utils::path::to_slash;

/// Write `<base>/dist.zip` or `<base>/build.zip` holding every file under
/// the output base. The archive never contains itself. Returns the number
/// of archived files, or `None` for modes without an archive.
pub fn create(target: &Target) -> Result<Option<usize>> {
    let Some(archive) = target.archive_path() else {
        return Ok(None);
    };
    let base = &target.paths.base;

    let mut files: Vec<_> = collect_all_files(base)
        .into_iter()
        .filter(|p| p != &archive)
        .collect();
    files.sort();

    let file = File::create(&archive)
        .with_context(|| format!("failed to create {}", archive.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in &files {
        let name = entry_name(base, path);
        zip.start_file(name.as_str(), options)?;
        let mut source =
            File::open(path).with_context(|| format!("failed to read {}", path.display()))?;
        io::copy(&mut source, &mut zip)?;
    }
    zip.finish()?;

    crate::log!("archive"; "{} ({})", target.output_key(&archive), crate::utils::plural_count(files.len(), "file"));
    Ok(Some(files.len()))
}

fn entry_name(base: &Path, path: &Path) -> String {
    to_slash(path.strip_prefix(base).unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::core::BuildMode;
    use std::fs;
    use tempfile::TempDir;

    fn names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<_> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_excludes_itself() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let target = Target::resolve(&config, BuildMode::Production);
        fs::create_dir_all(target.paths.css.clone()).unwrap();
        fs::write(target.paths.base.join("index.html"), "<p>hi</p>").unwrap();
        fs::write(target.paths.css.join("main.css"), "a{}").unwrap();
        // stale archive from a previous run
        fs::write(target.paths.base.join("build.zip"), "old").unwrap();

        assert_eq!(create(&target).unwrap(), Some(2));
        let archive = dir.path().join("build/build.zip");
        assert_eq!(names(&archive), ["css/main.css", "index.html"]);
    }

    #[test]
    fn test_development_has_no_archive() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let target = Target::resolve(&config, BuildMode::Development);
        assert_eq!(create(&target).unwrap(), None);
    }
}

//! Output and temp cleanup.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;
use crate::core::{BuildMode, Target};
use crate::utils::fs::remove_dir;

/// Directories `clear` removes before a build in `mode`: the active base,
/// or every base plus temp for init.
pub fn targets_for(config: &Config, mode: BuildMode) -> Vec<PathBuf> {
    match mode {
        BuildMode::Init => everything(config),
        _ => vec![Target::resolve(config, mode).paths.base],
    }
}

/// Every output base plus the temp root.
pub fn everything(config: &Config) -> Vec<PathBuf> {
    config
        .target
        .bases()
        .iter()
        .map(|base| config.root_join(base))
        .chain([config.temp_root()])
        .collect()
}

/// Remove `dirs`, returning the ones that existed.
pub fn remove_all(config: &Config, dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for dir in dirs {
        if remove_dir(dir)? {
            crate::debug!("clear"; "removed {}", config.root_relative(dir).display());
            removed.push(dir.clone());
        }
    }
    Ok(removed)
}

/// Pre-build clear for `mode`.
pub fn outputs(config: &Config, mode: BuildMode) -> Result<Vec<PathBuf>> {
    remove_all(config, &targets_for(config, mode))
}

/// The standalone `clear` task.
pub fn all(config: &Config) -> Result<Vec<PathBuf>> {
    let removed = remove_all(config, &everything(config))?;
    if removed.is_empty() {
        crate::log!("clear"; "nothing to remove");
    } else {
        let names: Vec<_> = removed
            .iter()
            .map(|d| config.root_relative(d).display().to_string())
            .collect();
        crate::log!("clear"; "removed {}", names.join(", "));
    }
    Ok(removed)
}

/// Remove the temp root after a build.
pub fn temp(config: &Config) -> Result<bool> {
    remove_dir(&config.temp_root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        for sub in ["dev/css", "dist", "build/js", "temp/sprite-1", "src/sass"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let config = test_config_at(dir.path(), "");
        (dir, config)
    }

    #[test]
    fn test_mode_clears_only_its_base() {
        let (dir, config) = project();
        let removed = outputs(&config, BuildMode::Production).unwrap();
        assert_eq!(removed, vec![dir.path().join("build")]);
        assert!(dir.path().join("dev").exists());
        assert!(dir.path().join("dist").exists());
        assert!(dir.path().join("temp").exists());
    }

    #[test]
    fn test_init_clears_everything() {
        let (dir, config) = project();
        let removed = outputs(&config, BuildMode::Init).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(!dir.path().join("temp").exists());
        assert!(dir.path().join("src/sass").exists());
    }

    #[test]
    fn test_clear_task() {
        let (dir, config) = project();
        all(&config).unwrap();
        for base in ["dev", "dist", "build", "temp"] {
            assert!(!dir.path().join(base).exists(), "{base}");
        }
        assert!(all(&config).unwrap().is_empty());
    }

    #[test]
    fn test_temp() {
        let (dir, config) = project();
        assert!(temp(&config).unwrap());
        assert!(!dir.path().join("temp").exists());
        assert!(!temp(&config).unwrap());
    }
}

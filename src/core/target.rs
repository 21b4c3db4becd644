//! The resolved output target passed into every pipeline.

use std::path::{Path, PathBuf};

use super::{BuildMode, ModeFlags};
use crate::config::{Config, TargetDirs};
use crate::utils::path::to_slash;

/// Absolute output directories for the active mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    pub base: PathBuf,
    pub html: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub fonts: PathBuf,
    pub img: PathBuf,
    pub svg_sprite: PathBuf,
    pub resources: PathBuf,
}

impl TargetPaths {
    fn from_dirs(root: &Path, dirs: &TargetDirs) -> Self {
        Self {
            base: root.join(&dirs.base),
            html: root.join(&dirs.html),
            css: root.join(&dirs.css),
            js: root.join(&dirs.js),
            fonts: root.join(&dirs.fonts),
            img: root.join(&dirs.img),
            svg_sprite: root.join(&dirs.svg_sprite),
            resources: root.join(&dirs.resources),
        }
    }
}

/// Mode, switches and output layout for one invocation.
#[derive(Debug, Clone)]
pub struct Target {
    pub mode: BuildMode,
    pub flags: ModeFlags,
    pub paths: TargetPaths,
    pub root: PathBuf,
}

impl Target {
    pub fn resolve(config: &Config, mode: BuildMode) -> Self {
        Self {
            mode,
            flags: mode.flags(),
            paths: TargetPaths::from_dirs(&config.root, config.target.for_mode(mode)),
            root: config.root.clone(),
        }
    }

    /// `<base>/manifest.json`.
    pub fn manifest_path(&self) -> PathBuf {
        self.paths.base.join("manifest.json")
    }

    /// `<base>/dist.zip` or `<base>/build.zip`.
    pub fn archive_path(&self) -> Option<PathBuf> {
        self.mode.archive_name().map(|name| self.paths.base.join(name))
    }

    /// Path below the output root with `/` separators, as used for
    /// manifest keys and in-page references.
    pub fn output_key(&self, path: &Path) -> String {
        to_slash(path.strip_prefix(&self.paths.base).unwrap_or(path))
    }
}

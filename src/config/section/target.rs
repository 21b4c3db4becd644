//! `[target.dev]`, `[target.dist]` and `[target.build]` output layouts.
//!
//! # Example
//!
//! ```toml
//! [target.dist]
//! base = "public"
//! html = "public"
//! css = "public/assets/css"
//! ```
//!
//! Every path is relative to the project root. Subdirectories left unset
//! default to the standard layout under `base`; the archive and manifest
//! are written to `base`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::BuildMode;

/// Output directories for one build mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDirs {
    pub base: PathBuf,
    pub html: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub fonts: PathBuf,
    pub img: PathBuf,
    /// Parent of `svg/` shape copies and `symbol/svg/sprite.symbol.svg`.
    pub svg_sprite: PathBuf,
    pub resources: PathBuf,
}

impl TargetDirs {
    /// Standard layout rooted at `base`.
    pub fn rooted(base: &str) -> Self {
        let base = PathBuf::from(base);
        Self {
            html: base.clone(),
            css: base.join("css"),
            js: base.join("js"),
            fonts: base.join("fonts"),
            img: base.join("img"),
            svg_sprite: base.join("img"),
            resources: base.join("resources"),
            base,
        }
    }

    fn subdirs(&self) -> [(&'static str, &Path); 7] {
        [
            ("html", &self.html),
            ("css", &self.css),
            ("js", &self.js),
            ("fonts", &self.fonts),
            ("img", &self.img),
            ("svg_sprite", &self.svg_sprite),
            ("resources", &self.resources),
        ]
    }
}

/// One `[target.*]` table as written, before defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTargetDirs {
    base: Option<PathBuf>,
    html: Option<PathBuf>,
    css: Option<PathBuf>,
    js: Option<PathBuf>,
    fonts: Option<PathBuf>,
    img: Option<PathBuf>,
    svg_sprite: Option<PathBuf>,
    resources: Option<PathBuf>,
}

impl RawTargetDirs {
    fn resolve(self, default_base: &str) -> TargetDirs {
        let base = self.base.unwrap_or_else(|| PathBuf::from(default_base));
        let standard = TargetDirs::rooted(&base.to_string_lossy());
        TargetDirs {
            html: self.html.unwrap_or(standard.html),
            css: self.css.unwrap_or(standard.css),
            js: self.js.unwrap_or(standard.js),
            fonts: self.fonts.unwrap_or(standard.fonts),
            img: self.img.unwrap_or(standard.img),
            svg_sprite: self.svg_sprite.unwrap_or(standard.svg_sprite),
            resources: self.resources.unwrap_or(standard.resources),
            base,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTargets {
    dev: RawTargetDirs,
    dist: RawTargetDirs,
    build: RawTargetDirs,
}

impl From<RawTargets> for TargetsConfig {
    fn from(raw: RawTargets) -> Self {
        Self {
            dev: raw.dev.resolve("dev"),
            dist: raw.dist.resolve("dist"),
            build: raw.build.resolve("build"),
        }
    }
}

/// The three output layouts, selected by [`BuildMode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawTargets")]
pub struct TargetsConfig {
    pub dev: TargetDirs,
    pub dist: TargetDirs,
    pub build: TargetDirs,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            dev: TargetDirs::rooted("dev"),
            dist: TargetDirs::rooted("dist"),
            build: TargetDirs::rooted("build"),
        }
    }
}

impl TargetsConfig {
    /// Layout used by `mode`. Init writes development output.
    pub fn for_mode(&self, mode: BuildMode) -> &TargetDirs {
        match mode {
            BuildMode::Development | BuildMode::Init => &self.dev,
            BuildMode::Distribution => &self.dist,
            BuildMode::Production => &self.build,
        }
    }

    /// All three base directories, for the `clear` task.
    pub fn bases(&self) -> [&Path; 3] {
        [&self.dev.base, &self.dist.base, &self.build.base]
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let named = [
            (FieldPath::new("target.dev"), &self.dev),
            (FieldPath::new("target.dist"), &self.dist),
            (FieldPath::new("target.build"), &self.build),
        ];

        for (field, dirs) in &named {
            if dirs.base.as_os_str().is_empty() || dirs.base == Path::new(".") {
                diag.error_with_hint(
                    *field,
                    "`base` must name a directory below the project root",
                    "clearing the target deletes `base` recursively",
                );
                continue;
            }
            if dirs.base.is_absolute() || dirs.base.components().any(is_parent) {
                diag.error(*field, "`base` must be a relative path inside the project");
            }
            for (name, dir) in dirs.subdirs() {
                if !dir.starts_with(&dirs.base) {
                    diag.error(
                        *field,
                        format!("`{name}` ({}) is outside `base`", dir.display()),
                    );
                }
            }
        }

        let [dev, dist, build] = self.bases();
        if dev == dist || dev == build || dist == build {
            diag.error(
                FieldPath::new("target"),
                "dev, dist and build must use different `base` directories",
            );
        }
    }
}

fn is_parent(component: std::path::Component<'_>) -> bool {
    matches!(component, std::path::Component::ParentDir)
}

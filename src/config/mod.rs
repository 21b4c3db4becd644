//! Project configuration management for `frontkit.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── source     # [source], [watch]
//! │   ├── target     # [target.dev], [target.dist], [target.build]
//! │   ├── sprite     # [sprite]
//! │   ├── lint       # [lint.html], [lint.style]
//! │   ├── output     # [beautify], [images]
//! │   └── serve      # [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional: every key has a default matching the
//! scaffold created by `frontkit --init`.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    BeautifyConfig, HrefPolicy, HtmlLintConfig, ImagesConfig, IndentPolicy, LintConfig, ServeConfig,
    SourceConfig, SpriteConfig, StyleLintConfig, TargetDirs, TargetsConfig, WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "frontkit.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing frontkit.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute project root (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Config file the values came from, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Source folders created by `--init`.
    pub folders: Vec<PathBuf>,

    /// Scratch root for sprite runs, removed after every build.
    pub temp_dir: PathBuf,

    /// Browserslist queries for CSS prefixing.
    pub browsers: Vec<String>,

    pub source: SourceConfig,
    pub watch: WatchConfig,
    pub target: TargetsConfig,
    pub sprite: SpriteConfig,
    pub lint: LintConfig,
    pub beautify: BeautifyConfig,
    pub images: ImagesConfig,
    pub serve: ServeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            config_path: None,
            folders: [
                "src",
                "src/html",
                "src/html/pages",
                "src/html/data",
                "src/html/layouts",
                "src/html/partials",
                "src/js",
                "src/sass",
                "src/img",
                "src/img/svg",
                "src/icons",
                "src/fonts",
                "src/resources",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            temp_dir: PathBuf::from("temp"),
            browsers: vec!["last 4 versions".to_string()],
            source: SourceConfig::default(),
            watch: WatchConfig::default(),
            target: TargetsConfig::default(),
            sprite: SpriteConfig::default(),
            lint: LintConfig::default(),
            beautify: BeautifyConfig::default(),
            images: ImagesConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// With `--root`, the config file is looked up in that directory only.
    /// Otherwise it is searched upward from the working directory and its
    /// parent becomes the project root. `--init` never searches upward:
    /// it scaffolds into the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current working directory")?;
        let name = cli.config.as_deref().unwrap_or(Path::new(CONFIG_FILE));

        let (root, config_path) = match &cli.root {
            Some(root) => {
                let root = cwd.join(root);
                let path = root.join(name);
                let found = path.is_file().then_some(path);
                (root, found)
            }
            None if cli.init => (cwd.clone(), cwd.join(name).is_file().then(|| cwd.join(name))),
            None => match find_config_file(&cwd, name) {
                Some(path) => {
                    let root = path.parent().map_or_else(|| cwd.clone(), Path::to_path_buf);
                    (root, Some(path))
                }
                None => (cwd.clone(), None),
            },
        };

        // An explicitly named config file must exist
        if config_path.is_none() && cli.config.is_some() {
            return Err(ConfigError::NotFound(root.join(name)).into());
        }

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        config.root = crate::utils::path::normalize_path(&root);
        config.config_path = config_path.map(|p| crate::utils::path::normalize_path(&p));
        config.validate()?;

        match &config.config_path {
            Some(path) => crate::debug!("config"; "loaded {}", path.display()),
            None => crate::debug!("config"; "no {} found, using defaults", name.display()),
        }

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Join a path with the project root.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute temp root.
    pub fn temp_root(&self) -> PathBuf {
        self.root_join(&self.temp_dir)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, collecting all errors before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.source.validate(&mut diag);
        self.watch.validate(&mut diag);
        self.target.validate(&mut diag);
        self.sprite.validate(&mut diag);
        self.lint.validate(&mut diag);
        self.beautify.validate(&mut diag);
        self.images.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.validate_paths(&mut diag);

        if let Err(e) = crate::asset::css::browser_targets(&self.browsers) {
            diag.error_with_hint(
                FieldPath::new("browsers"),
                e,
                "see https://browsersl.ist for the query syntax",
            );
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        if self.temp_dir.as_os_str().is_empty() || self.temp_dir.is_absolute() {
            diag.error(
                FieldPath::new("temp_dir"),
                "must be a relative directory inside the project",
            );
        } else if self
            .target
            .bases()
            .iter()
            .any(|base| self.temp_dir.starts_with(base) || base.starts_with(&self.temp_dir))
        {
            diag.error(
                FieldPath::new("temp_dir"),
                "must not overlap an output directory",
            );
        }

        if self.folders.iter().any(|f| f.is_absolute()) {
            diag.warn(
                FieldPath::new("folders"),
                "absolute entries are created outside the project",
            );
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from inline TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse config from inline TOML and root it at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> Config {
    let mut config = test_parse_config(content);
    config.root = root.to_path_buf();
    config
}

// ============================================================================
// tests
// ============================================================================

//! Build mode resolution and per-mode behavior switches.

use std::fmt;

/// The output target selected for one process invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Unminified output with live reload and watch.
    Development,
    /// Optimized but readable output, archived to `dist.zip`.
    Distribution,
    /// Minified, hashed output, archived to `build.zip`.
    Production,
    /// Scaffold source folders, then build development output once.
    Init,
}

impl BuildMode {
    /// Resolve the mode from the command flags.
    ///
    /// Flags are not mutually exclusive on the command line; when several
    /// are given, `dist` wins over `build`, which wins over `init`.
    pub const fn resolve(dist: bool, build: bool, init: bool) -> Self {
        if dist {
            Self::Distribution
        } else if build {
            Self::Production
        } else if init {
            Self::Init
        } else {
            Self::Development
        }
    }

    /// Short name used in logs and archive names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Distribution => "dist",
            Self::Production => "build",
            Self::Init => "init",
        }
    }

    /// Behavior switches for this mode.
    pub const fn flags(self) -> ModeFlags {
        match self {
            Self::Development => ModeFlags::DEVELOPMENT,
            Self::Distribution => ModeFlags::DISTRIBUTION,
            Self::Production => ModeFlags::PRODUCTION,
            Self::Init => ModeFlags::INIT,
        }
    }

    /// Archive file name, for modes that produce one.
    pub const fn archive_name(self) -> Option<&'static str> {
        match self {
            Self::Distribution => Some("dist.zip"),
            Self::Production => Some("build.zip"),
            Self::Development | Self::Init => None,
        }
    }

    /// Whether this invocation ends in a long-running watch.
    pub const fn is_watch(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-mode pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlags {
    /// Minify CSS and JS.
    pub minify: bool,
    /// Content-hash CSS/JS filenames and write the manifest.
    pub hash: bool,
    /// Append source maps to scripts.
    pub sourcemap: bool,
    /// Recompress images.
    pub compress_images: bool,
    /// Pretty-print HTML and rewrite hashed references.
    pub pretty_html: bool,
    /// Notify the preview server after writes.
    pub live_reload: bool,
}

impl ModeFlags {
    pub const DEVELOPMENT: Self = Self {
        minify: false,
        hash: false,
        sourcemap: true,
        compress_images: false,
        pretty_html: false,
        live_reload: true,
    };

    pub const INIT: Self = Self {
        live_reload: false,
        ..Self::DEVELOPMENT
    };

    pub const DISTRIBUTION: Self = Self {
        minify: false,
        hash: true,
        sourcemap: true,
        compress_images: true,
        pretty_html: true,
        live_reload: false,
    };

    pub const PRODUCTION: Self = Self {
        minify: true,
        hash: true,
        sourcemap: false,
        compress_images: true,
        pretty_html: true,
        live_reload: false,
    };
}

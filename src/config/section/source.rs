//! `[source]` and `[watch]` section configuration.
//!
//! Globs are relative to the project root and use `globset` syntax
//! (`*` does not cross `/`, `**` does, `{a,b}` alternation).
//!
//! # Example
//!
//! ```toml
//! [source]
//! html = "src/html/pages/*.html"
//! js = "src/js/index.js"
//! sass = ["src/sass/main.{sass,scss}"]
//!
//! [watch]
//! sass = "src/sass/**/*.{sass,scss,css}"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::glob::SourceGlob;

/// Pipeline inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page templates rendered to HTML.
    pub html: String,
    /// Template root holding `pages/`, `layouts/`, `partials/`, `helpers/`, `data/`.
    pub templates: PathBuf,
    /// Script entry point.
    pub js: PathBuf,
    /// Stylesheet entry points (one CSS file each).
    pub sass: Vec<String>,
    pub img: String,
    pub icons: String,
    pub svg: String,
    pub fonts: String,
    pub resources: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            html: "src/html/pages/*.html".into(),
            templates: "src/html".into(),
            js: "src/js/index.js".into(),
            sass: vec![
                "src/sass/main.{sass,scss}".into(),
                "src/sass/second.{sass,scss}".into(),
            ],
            img: "src/img/**/*.{jpg,jpeg,png}".into(),
            icons: "src/icons/**/*.png".into(),
            svg: "src/img/svg/**/*.svg".into(),
            fonts: "src/fonts/**/*".into(),
            resources: "src/resources/**/*".into(),
        }
    }
}

impl SourceConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let single = [
            (FieldPath::new("source.html"), &self.html),
            (FieldPath::new("source.img"), &self.img),
            (FieldPath::new("source.icons"), &self.icons),
            (FieldPath::new("source.svg"), &self.svg),
            (FieldPath::new("source.fonts"), &self.fonts),
            (FieldPath::new("source.resources"), &self.resources),
        ];
        for (field, pattern) in single {
            check_glob(field, std::slice::from_ref(pattern), diag);
        }

        if self.sass.is_empty() {
            diag.error_with_hint(
                FieldPath::new("source.sass"),
                "no stylesheet entry points",
                "add at least one glob, e.g. \"src/sass/main.scss\"",
            );
        } else {
            check_glob(FieldPath::new("source.sass"), &self.sass, diag);
        }

        if self.js.as_os_str().is_empty() {
            diag.error(FieldPath::new("source.js"), "script entry point is empty");
        }
    }
}

/// Watch globs, one per binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub sass: String,
    pub js: String,
    pub html: String,
    /// Template-only files: changes refresh the template cache only.
    pub templates: String,
    pub img: String,
    pub icons: String,
    pub svg: String,
    pub fonts: String,
    pub resources: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sass: "src/sass/**/*.{sass,scss,css}".into(),
            js: "src/js/**/*.{js,mjs}".into(),
            html: "src/html/**/*.{html,json}".into(),
            templates: "src/html/{data,helpers,layouts,partials}/**/*".into(),
            img: "src/img/**/*.{jpg,jpeg,png}".into(),
            icons: "src/icons/**/*.png".into(),
            svg: "src/img/svg/**/*.svg".into(),
            fonts: "src/fonts/**/*".into(),
            resources: "src/resources/**/*".into(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let all = [
            (FieldPath::new("watch.sass"), &self.sass),
            (FieldPath::new("watch.js"), &self.js),
            (FieldPath::new("watch.html"), &self.html),
            (FieldPath::new("watch.templates"), &self.templates),
            (FieldPath::new("watch.img"), &self.img),
            (FieldPath::new("watch.icons"), &self.icons),
            (FieldPath::new("watch.svg"), &self.svg),
            (FieldPath::new("watch.fonts"), &self.fonts),
            (FieldPath::new("watch.resources"), &self.resources),
        ];
        for (field, pattern) in all {
            check_glob(field, std::slice::from_ref(pattern), diag);
        }
    }
}

fn check_glob(field: FieldPath, patterns: &[String], diag: &mut ConfigDiagnostics) {
    if let Err(e) = SourceGlob::new(patterns) {
        diag.error(field, format!("invalid glob: {e}"));
    }
}

//! Page templating with handlebars.
//!
//! The template root (`src/html` by default) holds:
//!
//! ```text
//! pages/      rendered one file each, layout picked by front matter
//! layouts/    `default.html` etc., include the page with {{> body}}
//! partials/   registered by path without extension (`nav`, `blocks/card`)
//! data/       *.json / *.yml, exposed to pages by file stem
//! helpers/    reserved; only built-in helpers are available
//! ```
//!
//! [`TemplateCache::refresh`] reloads everything except pages. Watch mode
//! calls it when a template-only file changes; the layout pipeline calls it
//! before every run.

mod front_matter;
mod helpers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use handlebars::Handlebars;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::utils::fs::read_to_string;
use crate::utils::path::to_slash;

/// Subdirectories of the template root that never become pages.
pub const TEMPLATE_DIRS: [&str; 4] = ["data", "layouts", "partials", "helpers"];

const DEFAULT_LAYOUT: &str = "default";
const BODY_PARTIAL: &str = "body";

/// Whether `rel` (relative to the template root) is a template-only file.
pub fn is_template_only(rel: &Path) -> bool {
    rel.components()
        .next()
        .is_some_and(|first| TEMPLATE_DIRS.iter().any(|dir| first.as_os_str() == *dir))
}

/// Loaded layouts, partials and data.
struct Loaded {
    registry: Handlebars<'static>,
    data: Map<String, Value>,
}

/// Counts from the last refresh, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateStats {
    pub layouts: usize,
    pub partials: usize,
    pub data: usize,
}

/// Shared, refreshable template state.
pub struct TemplateCache {
    root: PathBuf,
    loaded: RwLock<Option<Arc<Loaded>>>,
}

/// A page ready to render.
pub struct Page<'a> {
    /// Page name used by `ifpage`: path below `pages/` without extension.
    pub name: String,
    /// `../` repeated once per directory level, for relative asset links.
    pub root: String,
    pub source: &'a str,
}

impl<'a> Page<'a> {
    /// Describe the page at `rel` (relative to the pages directory).
    pub fn new(rel: &Path, source: &'a str) -> Self {
        let depth = rel.components().count().saturating_sub(1);
        Self {
            name: to_slash(&rel.with_extension("")),
            root: "../".repeat(depth),
            source,
        }
    }
}

impl TemplateCache {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            loaded: RwLock::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reload layouts, partials and data from disk.
    ///
    /// On error the previous state stays in place.
    pub fn refresh(&self) -> Result<TemplateStats> {
        let mut registry = Handlebars::new();
        helpers::register(&mut registry);
        let mut stats = TemplateStats::default();

        for (name, path) in self.files("layouts", &["html", "hbs"]) {
            let src = read_to_string(&path)?;
            registry
                .register_template_string(&name, src)
                .with_context(|| format!("invalid layout {}", path.display()))?;
            stats.layouts += 1;
        }

        for (name, path) in self.files("partials", &["html", "hbs"]) {
            let src = read_to_string(&path)?;
            registry
                .register_partial(&name, src)
                .with_context(|| format!("invalid partial {}", path.display()))?;
            stats.partials += 1;
        }

        let mut data = Map::new();
        for (name, path) in self.files("data", &["json", "yml", "yaml"]) {
            let src = read_to_string(&path)?;
            let value: Value = if path.extension().is_some_and(|e| e == "json") {
                serde_json::from_str(&src)
                    .with_context(|| format!("invalid data file {}", path.display()))?
            } else {
                serde_yaml::from_str(&src)
                    .with_context(|| format!("invalid data file {}", path.display()))?
            };
            data.insert(name, value);
            stats.data += 1;
        }

        for (name, _) in self.files("helpers", &["js"]) {
            crate::log!("template"; "helper `{}` ignored, only built-in helpers are available", name);
        }

        *self.loaded.write() = Some(Arc::new(Loaded { registry, data }));
        crate::debug!(
            "template";
            "{} layouts, {} partials, {} data files",
            stats.layouts,
            stats.partials,
            stats.data
        );
        Ok(stats)
    }

    /// Render `page` through its layout.
    ///
    /// Context: data files by stem, then front matter, then `page` and
    /// `root`. The page body is available to the layout as `{{> body}}`.
    pub fn render(&self, page: &Page<'_>) -> Result<String> {
        let current = self.loaded.read().clone();
        let loaded = match current {
            Some(loaded) => loaded,
            None => {
                self.refresh()?;
                self.loaded
                    .read()
                    .clone()
                    .ok_or_else(|| anyhow!("templates not loaded"))?
            }
        };

        let (front, body) = front_matter::split(page.source)?;
        let mut context = loaded.data.clone();
        context.extend(front);
        context.insert("page".into(), Value::from(page.name.clone()));
        context.insert("root".into(), Value::from(page.root.clone()));
        let layout = context
            .get("layout")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LAYOUT)
            .to_string();

        if !loaded.registry.has_template(&layout) {
            return Err(anyhow!(
                "layout `{layout}` not found in {}",
                self.root.join("layouts").display()
            ));
        }

        let mut registry = loaded.registry.clone();
        registry
            .register_partial(BODY_PARTIAL, body)
            .context("invalid page template")?;
        let html = registry.render(&layout, &Value::Object(context))?;
        Ok(html)
    }

    /// Files below `<root>/<dir>` with one of `exts`, keyed by stem path.
    fn files(&self, dir: &str, exts: &[&str]) -> Vec<(String, PathBuf)> {
        let base = self.root.join(dir);
        let mut files: Vec<(String, PathBuf)> = crate::utils::fs::collect_all_files(&base)
            .into_iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| exts.contains(&e))
            })
            .filter_map(|p| {
                let rel = p.strip_prefix(&base).ok()?.with_extension("");
                Some((to_slash(&rel), p))
            })
            .collect();
        files.sort();
        files
    }
}

#[cfg(test)]
mod tests;

//! Single-entry script bundler.
//!
//! Walks the relative-import graph from one entry file, rewrites each
//! module's `import`/`export` statements into registry calls, lowers the
//! result to ES2015 and concatenates everything inside one IIFE, after the
//! `babelHelpers` the lowered code calls.
//!
//! ```text
//! entry ─► rewrite ─► (discovers imports) ─► queue
//!   │
//!   └─► transpile each module ─► wrap in __define(id, ...) ─► HEADER + helpers + modules + FOOTER
//! ```
//!
//! Package imports, dynamic `import()` and code splitting are not handled.

mod helpers;
mod resolve;
mod rewrite;
mod runtime;
mod source_map;

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::asset::js;
use crate::utils::path::to_slash;

use self::source_map::SourceMapMerger;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {message}")]
    Parse { path: String, message: String },
    #[error("cannot resolve '{specifier}' imported from {importer}")]
    Unresolved { specifier: String, importer: String },
    #[error("package import '{specifier}' in {importer}: only relative imports are bundled")]
    Bare { specifier: String, importer: String },
    #[error("{path}: {message}")]
    Transform { path: String, message: String },
    #[error("source map: {0}")]
    SourceMap(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BundleOptions {
    /// Append an inline source map covering every module.
    pub sourcemap: bool,
}

/// One source file in the graph. Ids follow discovery order; the entry is 0.
#[derive(Debug)]
struct Module {
    display: String,
    source: String,
    body: String,
}

/// Bundle `entry` and its relative imports.
///
/// `root` anchors `/`-prefixed imports and the module paths shown in
/// comments, errors and the source map. `file` names the output in the map.
pub fn bundle(
    entry: &Path,
    root: &Path,
    file: &str,
    options: BundleOptions,
) -> Result<String, BundleError> {
    let modules = collect(entry, root)?;

    let lowered = modules
        .iter()
        .map(|module| {
            js::transpile(&module.body, &module.display, options.sourcemap).map_err(|e| {
                BundleError::Transform {
                    path: module.display.clone(),
                    message: format!("{e:#}"),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let used: BTreeSet<String> = lowered
        .iter()
        .flat_map(|module| helpers::referenced(&module.code))
        .collect();
    let runtime_helpers = helpers::emit(&used).map_err(|name| BundleError::Transform {
        path: entry_display(&modules),
        message: format!("syntax needs the unsupported `{name}` helper"),
    })?;

    let mut out = String::from(runtime::HEADER);
    out.push_str(&runtime_helpers);
    let mut merger = options.sourcemap.then(|| SourceMapMerger::new(file));

    for (id, (module, lowered)) in modules.iter().zip(&lowered).enumerate() {
        out.push_str(&runtime::module_open(id, &module.display));
        if let (Some(merger), Some(map)) = (merger.as_mut(), lowered.map.as_deref()) {
            let offset = runtime::line_count(&out);
            merger.add_module(map, &module.display, &module.source, offset)?;
        }
        out.push_str(&lowered.code);
        if !lowered.code.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(runtime::MODULE_CLOSE);
        crate::debug!("bundle"; "{} -> #{}", module.display, id);
    }

    out.push_str(runtime::FOOTER);
    if let Some(merger) = merger {
        out.push_str(&merger.into_comment()?);
    }
    Ok(out)
}

fn entry_display(modules: &[Module]) -> String {
    modules
        .first()
        .map(|module| module.display.clone())
        .unwrap_or_default()
}

/// Breadth-first walk from the entry, rewriting each module as it is read.
fn collect(entry: &Path, root: &Path) -> Result<Vec<Module>, BundleError> {
    let entry = entry.canonicalize().map_err(|source| BundleError::Read {
        path: display_path(entry, root),
        source,
    })?;
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let mut ids: FxHashMap<PathBuf, usize> = FxHashMap::default();
    let mut paths = vec![entry.clone()];
    ids.insert(entry, 0);

    let mut queue = VecDeque::from([0usize]);
    let mut modules: Vec<Option<Module>> = vec![None];

    while let Some(id) = queue.pop_front() {
        let path = paths[id].clone();
        let display = display_path(&path, &root);
        let source = std::fs::read_to_string(&path).map_err(|source| BundleError::Read {
            path: display.clone(),
            source,
        })?;

        let body = rewrite::rewrite(&source, &display, |specifier| {
            let target = resolve::resolve(specifier, &path, &root, &display)?;
            if let Some(&known) = ids.get(&target) {
                return Ok(known);
            }
            let next = paths.len();
            ids.insert(target.clone(), next);
            paths.push(target);
            modules.push(None);
            queue.push_back(next);
            Ok(next)
        })?;

        modules[id] = Some(Module {
            display,
            source,
            body,
        });
    }

    Ok(modules.into_iter().flatten().collect())
}

fn display_path(path: &Path, root: &Path) -> String {
    to_slash(path.strip_prefix(root).unwrap_or(path))
}

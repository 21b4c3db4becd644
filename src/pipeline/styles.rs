//! Styles: lint, Sass, WebP rules, prefixes, minify, hash.
//!
//! Every `[source] sass` entry becomes one CSS file in the target `css`
//! directory. Sass partials (`_name.scss`) are never entries.

use std::path::Path;

use anyhow::{Result, anyhow};

use super::{Context, PipelineReport, Stage};
use crate::asset::{css, revision, webp};
use crate::lint::{LintReport, style};
use crate::utils::fs::read_to_string;
use crate::utils::glob::{SourceFile, SourceGlob};
use crate::utils::path::to_slash;

pub fn run(ctx: &Context) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::Styles);
    let entries = entries(ctx)?;

    lint(ctx, &entries)?;

    for entry in &entries {
        let compiled = compile(&entry.path)?;
        let file_name = css_name(&entry.rel);
        let out_dir = match entry.rel.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => ctx.target.paths.css.join(parent),
            _ => ctx.target.paths.css.clone(),
        };
        let code = finish(ctx, &compiled, &file_name)?;
        revision::emit(&out_dir, &file_name, code.as_bytes(), &ctx.target, &mut report)?;
    }

    crate::manifest::record(&ctx.target.manifest_path(), &report.manifest)?;
    Ok(report)
}

fn entries(ctx: &Context) -> Result<Vec<SourceFile>> {
    let glob = SourceGlob::new(&ctx.config.source.sass)?;
    Ok(glob
        .collect(&ctx.target.root)
        .into_iter()
        .filter(|f| !is_partial(&f.path))
        .collect())
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

fn lint(ctx: &Context, entries: &[SourceFile]) -> Result<()> {
    let config = &ctx.config.lint.style;
    let mut report = LintReport::new("stylelint");
    for entry in entries {
        let src = read_to_string(&entry.path)?;
        let indented = entry.path.extension().is_some_and(|e| e == "sass");
        let rel = ctx.config.root_relative(&entry.path);
        report.add(to_slash(&rel), style::lint(&src, indented, config));
    }
    report.finish(config.strict)?;
    Ok(())
}

/// Compile one Sass/SCSS/CSS file. Syntax follows the extension.
fn compile(path: &Path) -> Result<String> {
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);
    grass::from_path(path, &options).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

/// `main.scss` -> `main.css`.
fn css_name(rel: &Path) -> String {
    rel.with_extension("css")
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "style.css".to_string())
}

/// Shared tail of every stylesheet: WebP sibling rules, then prefixing and
/// minification in one lightningcss pass.
pub(super) fn finish(ctx: &Context, css_source: &str, file_name: &str) -> Result<String> {
    let with_webp = webp::rewrite_css(css_source);
    css::process(
        &with_webp,
        file_name,
        ctx.css_targets,
        ctx.target.flags.minify,
    )
}

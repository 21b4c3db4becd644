//! Layout: render pages through handlebars layouts into the target `html`
//! directory.
//!
//! ```text
//! page ─► front matter + data ─► layout ─► [beautify] ─► lint ─► <picture> ─► [hashed refs]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Context, PipelineReport, Stage};
use crate::asset::beautify::beautify;
use crate::asset::revision::rewrite_references;
use crate::asset::webp::wrap_pictures;
use crate::lint::{LintReport, html};
use crate::manifest::Manifest;
use crate::template::{Page, is_template_only};
use crate::utils::fs::{read_to_string, write_file};
use crate::utils::glob::{SourceFile, SourceGlob};
use crate::utils::path::to_slash;

pub fn run(ctx: &Context) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::Layout);
    let flags = ctx.target.flags;
    ctx.templates.refresh()?;

    let manifest = if flags.hash {
        Manifest::load(&ctx.target.manifest_path())?
    } else {
        Manifest::default()
    };

    let mut lint = LintReport::new("htmlhint");
    let mut rendered: Vec<(PathBuf, String)> = Vec::new();

    for file in pages(ctx)? {
        let rel = page_rel(ctx.templates.root(), &file);
        let name = to_slash(&rel);
        let source = read_to_string(&file.path)?;
        let mut page_html = ctx
            .templates
            .render(&Page::new(&rel, &source))
            .with_context(|| format!("failed to render {name}"))?;

        if flags.pretty_html {
            page_html = beautify(&page_html, &ctx.config.beautify.unit());
        }
        lint.add(name, html::lint(&page_html, &ctx.config.lint.html));
        rendered.push((rel, page_html));
    }

    lint.finish(ctx.config.lint.html.fail)?;

    for (rel, page_html) in rendered {
        let mut page_html = wrap_pictures(&page_html);
        if flags.hash {
            page_html = rewrite_references(&page_html, &manifest);
        }
        let out = ctx.target.paths.html.join(&rel);
        write_file(&out, page_html)?;
        report.wrote(out);
    }

    Ok(report)
}

/// Page sources, minus anything inside a template-only directory.
fn pages(ctx: &Context) -> Result<Vec<SourceFile>> {
    let glob = SourceGlob::single(&ctx.config.source.html)?;
    let root = ctx.templates.root();
    Ok(glob
        .collect(&ctx.target.root)
        .into_iter()
        .filter(|f| {
            f.path
                .strip_prefix(root)
                .map_or(true, |rel| !is_template_only(rel))
        })
        .collect())
}

/// Output path of a page: below `pages/` when it lives there, else below
/// the template root, else the glob-relative path.
fn page_rel(template_root: &Path, file: &SourceFile) -> PathBuf {
    let pages = template_root.join("pages");
    file.path
        .strip_prefix(&pages)
        .or_else(|_| file.path.strip_prefix(template_root))
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| file.rel.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use crate::pipeline::tests::test_context;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    const LAYOUT: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n<title>{{title}}</title>\n<link rel=\"stylesheet\" href=\"{{root}}css/main.css\" />\n</head>\n<body>\n{{> body}}\n<script src=\"{{root}}js/all.js\"></script>\n</body>\n</html>\n";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/html/layouts/default.html", LAYOUT);
        write(root, "src/html/partials/header.html", "<header>{{site.name}}</header>");
        write(root, "src/html/data/site.json", r#"{"name": "Acme"}"#);
        write(
            root,
            "src/html/pages/index.html",
            "---\ntitle: Home\n---\n{{> header}}\n<img src=\"img/hero.jpg\" alt=\"Hero\" />\n",
        );
        write(
            root,
            "src/html/pages/blog/post.html",
            "---\ntitle: Post\n---\n<p>post</p>\n",
        );
        dir
    }

    /// Page glob that also picks up `pages/blog/post.html`.
    const NESTED_PAGES: &str = "[source]\nhtml = \"src/html/pages/**/*.html\"";

    #[test]
    fn test_development_render() {
        let dir = project();
        let ctx = test_context(dir.path(), NESTED_PAGES, BuildMode::Development);
        let report = run(&ctx).unwrap();
        assert_eq!(report.written.len(), 2);

        let index = fs::read_to_string(dir.path().join("dev/index.html")).unwrap();
        assert!(index.contains("<title>Home</title>"));
        assert!(index.contains("<header>Acme</header>"));
        assert!(index.contains("href=\"css/main.css\""));
        assert!(index.contains(
            "<picture><source srcset=\"img/hero.webp\" type=\"image/webp\"><img src=\"img/hero.jpg\" alt=\"Hero\" /></picture>"
        ));

        let post = fs::read_to_string(dir.path().join("dev/blog/post.html")).unwrap();
        assert!(post.contains("href=\"../css/main.css\""));
    }

    #[test]
    fn test_default_glob_is_top_level_only() {
        let dir = project();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let report = run(&ctx).unwrap();
        assert_eq!(report.written.len(), 1);
        assert!(dir.path().join("dev/index.html").exists());
        assert!(!dir.path().join("dev/blog").exists());
    }

    #[test]
    fn test_template_only_files_never_rendered() {
        let dir = project();
        let toml = "[source]\nhtml = \"src/html/**/*.html\"";
        let ctx = test_context(dir.path(), toml, BuildMode::Development);
        run(&ctx).unwrap();

        assert!(dir.path().join("dev/index.html").exists());
        assert!(!dir.path().join("dev/layouts").exists());
        assert!(!dir.path().join("dev/partials").exists());
    }

    #[test]
    fn test_distribution_rewrites_and_beautifies() {
        let dir = project();
        let ctx = test_context(dir.path(), NESTED_PAGES, BuildMode::Distribution);
        crate::manifest::record(
            &ctx.target.manifest_path(),
            &BTreeMap::from([
                ("css/main.css".to_string(), "css/main-0123456789.css".to_string()),
                ("js/all.js".to_string(), "js/all-9876543210.js".to_string()),
            ]),
        )
        .unwrap();

        run(&ctx).unwrap();
        let index = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(index.contains("css/main-0123456789.css"), "{index}");
        assert!(index.contains("js/all-9876543210.js"), "{index}");
        assert!(index.contains("\n    <title>Home</title>"), "{index}");

        let post = fs::read_to_string(dir.path().join("dist/blog/post.html")).unwrap();
        assert!(post.contains("../css/main-0123456789.css"), "{post}");
    }

    #[test]
    fn test_development_keeps_plain_names() {
        let dir = project();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        crate::manifest::record(
            &ctx.target.manifest_path(),
            &BTreeMap::from([("css/main.css".to_string(), "css/main-x.css".to_string())]),
        )
        .unwrap();
        run(&ctx).unwrap();
        let index = fs::read_to_string(dir.path().join("dev/index.html")).unwrap();
        assert!(!index.contains("main-x.css"));
    }

    #[test]
    fn test_lint_failure_blocks_output() {
        let dir = project();
        write(dir.path(), "src/html/pages/index.html", "<img src=\"a.png\">\n");
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let err = run(&ctx).unwrap_err();
        assert!(err.to_string().contains("htmlhint"), "{err}");
        assert!(!dir.path().join("dev/index.html").exists());
    }

    #[test]
    fn test_lint_report_only() {
        let dir = project();
        write(dir.path(), "src/html/pages/index.html", "<img src=\"a.png\">\n");
        let toml = "[lint.html]\nfail = false";
        let ctx = test_context(dir.path(), toml, BuildMode::Development);
        run(&ctx).unwrap();
        assert!(dir.path().join("dev/index.html").exists());
    }

    #[test]
    fn test_render_error_names_page() {
        let dir = project();
        write(dir.path(), "src/html/pages/broken.html", "{{#if}}\n");
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let err = run(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("broken"), "{err:#}");
    }
}

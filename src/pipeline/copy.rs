//! Fonts and resources: copied as-is, keeping their relative layout.

use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;

use super::{Context, PipelineReport, Stage};
use crate::utils::fs::copy_file;
use crate::utils::glob::SourceGlob;

pub fn fonts(ctx: &Context) -> Result<PipelineReport> {
    copy(ctx, Stage::Fonts, &ctx.config.source.fonts, &ctx.target.paths.fonts)
}

pub fn resources(ctx: &Context) -> Result<PipelineReport> {
    copy(
        ctx,
        Stage::Resources,
        &ctx.config.source.resources,
        &ctx.target.paths.resources,
    )
}

fn copy(ctx: &Context, stage: Stage, pattern: &str, out_dir: &Path) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(stage);
    let files = SourceGlob::single(pattern)?.collect(&ctx.target.root);

    report.written = files
        .par_iter()
        .map(|f| {
            let out = out_dir.join(&f.rel);
            copy_file(&f.path, &out)?;
            Ok(out)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use crate::pipeline::tests::test_context;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fonts_keep_layout() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src/fonts/inter");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("inter.woff2"), b"wOF2").unwrap();

        let ctx = test_context(dir.path(), "", BuildMode::Production);
        let report = fonts(&ctx).unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(
            fs::read(dir.path().join("build/fonts/inter/inter.woff2")).unwrap(),
            b"wOF2"
        );
    }

    #[test]
    fn test_resources_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        let res = dir.path().join("src/resources");
        fs::create_dir_all(res.join("docs")).unwrap();
        fs::write(res.join("robots.txt"), "User-agent: *\n").unwrap();
        fs::write(res.join("docs/guide.pdf"), b"%PDF").unwrap();

        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let report = resources(&ctx).unwrap();
        assert_eq!(report.written.len(), 2);
        let out = &ctx.target.paths.resources;
        assert_eq!(
            fs::read_to_string(out.join("robots.txt")).unwrap(),
            "User-agent: *\n"
        );
        assert!(out.join("docs/guide.pdf").is_file());
    }

    #[test]
    fn test_missing_source_dir() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        assert!(fonts(&ctx).unwrap().written.is_empty());
    }
}

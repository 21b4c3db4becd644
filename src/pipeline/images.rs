//! Images: newer-only recompression plus a WebP copy of every raster.

use std::path::Path;

use anyhow::{Context as _, Result};
use rayon::prelude::*;

use super::{Context, PipelineReport, Stage};
use crate::image::raster::{self, Compression};
use crate::utils::fs::{copy_file, needs_update, write_file};
use crate::utils::glob::SourceGlob;

pub fn run(ctx: &Context) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::Images);
    let glob = SourceGlob::single(&ctx.config.source.img)?;
    let out_dir = &ctx.target.paths.img;

    let (stale, fresh): (Vec<_>, Vec<_>) = glob
        .collect(&ctx.target.root)
        .into_iter()
        .partition(|f| needs_update(&f.path, &out_dir.join(&f.rel)));
    report.skipped = fresh.len();

    let compression = ctx.target.flags.compress_images.then_some(Compression {
        jpeg_quality: ctx.config.images.jpeg_quality,
    });

    let written = stale
        .par_iter()
        .map(|f| emit_raster(&f.path, &out_dir.join(&f.rel), compression))
        .collect::<Result<Vec<_>>>()?;
    for paths in written {
        report.written.extend(paths);
    }
    Ok(report)
}

/// Write `source` to `out` (recompressed when `compression` is set) and its
/// WebP copy next to it. Returns both written paths.
pub(super) fn emit_raster(
    source: &Path,
    out: &Path,
    compression: Option<Compression>,
) -> Result<[std::path::PathBuf; 2]> {
    let data =
        std::fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let img = raster::decode(&data, source)?;

    match compression {
        Some(options) => {
            let format = raster::format_of(source)?;
            write_file(out, raster::compress(&img, format, options)?)?;
        }
        None => copy_file(source, out)?,
    }

    let webp = out.with_extension("webp");
    write_file(&webp, raster::to_webp(&img)?)?;
    crate::debug!("images"; "{}", out.display());
    Ok([out.to_path_buf(), webp])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BuildMode;
    use crate::pipeline::tests::test_context;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let img = dir.path().join("src/img/photos");
        fs::create_dir_all(&img).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]))
            .save(img.join("a.png"))
            .unwrap();
        RgbImage::from_pixel(4, 4, Rgb([200, 10, 30]))
            .save(dir.path().join("src/img/b.jpg"))
            .unwrap();
        dir
    }

    #[test]
    fn test_original_and_webp_written() {
        let dir = project();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let report = run(&ctx).unwrap();

        assert_eq!(report.written.len(), 4);
        let out = dir.path().join("dev/img");
        assert!(out.join("photos/a.png").is_file());
        assert!(out.join("photos/a.webp").is_file());
        assert!(out.join("b.jpg").is_file());
        assert!(out.join("b.webp").is_file());
        // development copies the original bytes
        assert_eq!(
            fs::read(out.join("b.jpg")).unwrap(),
            fs::read(dir.path().join("src/img/b.jpg")).unwrap()
        );
    }

    #[test]
    fn test_newer_only() {
        let dir = project();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        run(&ctx).unwrap();

        let report = run(&ctx).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_production_recompresses() {
        let dir = project();
        let ctx = test_context(dir.path(), "", BuildMode::Production);
        run(&ctx).unwrap();

        let png = fs::read(dir.path().join("build/img/photos/a.png")).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &Rgb([10, 200, 30]));
        assert!(dir.path().join("build/img/photos/a.webp").is_file());
    }

    #[test]
    fn test_corrupt_image_fails() {
        let dir = project();
        fs::write(dir.path().join("src/img/c.png"), b"nope").unwrap();
        let ctx = test_context(dir.path(), "", BuildMode::Development);
        let err = run(&ctx).unwrap_err();
        assert!(err.to_string().contains("c.png"), "{err}");
    }
}

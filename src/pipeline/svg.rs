//! SVG: normalized shape copies plus one `<symbol>` sprite.
//!
//! ```text
//! <svg_sprite>/svg/<stem>.svg
//! <svg_sprite>/symbol/svg/sprite.symbol.svg
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::{Context, PipelineReport, Stage};
use crate::image::svg::{SymbolSprite, normalize, to_symbol};
use crate::utils::fs::write_file;
use crate::utils::glob::SourceGlob;

const SHAPES_DIR: &str = "svg";
const SPRITE_PATH: &str = "symbol/svg/sprite.symbol.svg";

struct Shape {
    id: String,
    svg: String,
}

pub fn run(ctx: &Context) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::Svg);
    let glob = SourceGlob::single(&ctx.config.source.svg)?;
    let sources = glob.collect(&ctx.target.root);
    if sources.is_empty() {
        return Ok(report);
    }

    let shapes = sources
        .par_iter()
        .map(|f| load_shape(&f.path))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = FxHashSet::default();
    for shape in &shapes {
        if !seen.insert(shape.id.as_str()) {
            bail!("duplicate symbol id `{}`: file names must be unique", shape.id);
        }
    }

    let out = &ctx.target.paths.svg_sprite;
    let mut sprite = SymbolSprite::new();
    for shape in &shapes {
        let path = out.join(SHAPES_DIR).join(format!("{}.svg", shape.id));
        write_file(&path, &shape.svg)?;
        report.wrote(path);
        sprite.push(to_symbol(&shape.svg, &shape.id)?);
    }

    let sprite_path: PathBuf = out.join(SPRITE_PATH);
    write_file(&sprite_path, sprite.render())?;
    report.wrote(sprite_path);
    crate::debug!("svg"; "{} symbols", sprite.len());
    Ok(report)
}

fn load_shape(path: &Path) -> Result<Shape> {
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let svg =
        normalize(&content, &format!("{id}-")).with_context(|| path.display().to_string())?;
    Ok(Shape { id, svg })
}

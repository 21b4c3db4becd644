//! Raster sprite: pack PNG icons into one sheet plus a stylesheet.
//!
//! Three reported stages share a per-run [`TempWorkspace`]:
//!
//! ```text
//! SpriteGenerate  icons ─► <temp>/icons-sprite.png, icons-sprite@2x.png, icons.css
//! SpriteImages    <temp>/*.png ─► <img>/  (+ .webp)
//! SpriteStyles    <temp>/icons.css ─► <css>/
//! ```
//!
//! Icons whose stem ends with the retina suffix go to the retina sheet at
//! twice the position of their normal counterpart.

mod pack;
mod stylesheet;

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use image::{DynamicImage, RgbaImage, imageops};
use rustc_hash::FxHashMap;

use super::images::emit_raster;
use super::{Context, PipelineError, PipelineReport, Stage, stage, styles};
use crate::asset::revision;
use crate::image::raster::{self, Compression};
use crate::utils::fs::{read_to_string, write_file};
use crate::utils::glob::SourceGlob;
use crate::workspace::TempWorkspace;

use stylesheet::{SheetRefs, SpriteItem};

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    let mut workspace = None;
    stage(ctx, Stage::SpriteGenerate, |ctx| {
        let ws = TempWorkspace::create(&ctx.config.temp_root(), "sprite")?;
        let report = generate(ctx, ws.path())?;
        workspace = Some(ws);
        Ok(report)
    })?;
    let Some(workspace) = workspace else {
        return Ok(());
    };

    stage(ctx, Stage::SpriteImages, |ctx| images(ctx, workspace.path()))?;
    stage(ctx, Stage::SpriteStyles, |ctx| style(ctx, workspace.path()))
}

struct Icon {
    name: String,
    image: RgbaImage,
}

struct IconSet {
    normal: Vec<Icon>,
    retina: FxHashMap<String, RgbaImage>,
}

fn load_icons(ctx: &Context) -> Result<IconSet> {
    let glob = SourceGlob::single(&ctx.config.source.icons)?;
    let suffix = &ctx.config.sprite.retina_suffix;

    let mut normal: Vec<Icon> = Vec::new();
    let mut retina = FxHashMap::default();
    let mut retina_files = FxHashMap::default();
    for file in glob.collect(&ctx.target.root) {
        let stem = file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        let image = raster::decode(&data, &file.path)?.to_rgba8();

        let (name, is_retina) = match stem.strip_suffix(suffix.as_str()) {
            Some(base) => (base.to_string(), true),
            None => (stem, false),
        };
        let duplicate = if is_retina {
            retina_files.insert(name.clone(), file.rel.clone());
            retina.insert(name.clone(), image).is_some()
        } else {
            let seen = normal.iter().any(|i| i.name == name);
            normal.push(Icon {
                name: name.clone(),
                image,
            });
            seen
        };
        if duplicate {
            bail!("duplicate icon name `{name}`: file names must be unique");
        }
    }

    for (name, image) in &retina {
        let file = retina_files[name].display();
        let Some(base) = normal.iter().find(|i| &i.name == name) else {
            bail!("retina icon {file} has no `{name}` counterpart");
        };
        if image.dimensions() != (base.image.width() * 2, base.image.height() * 2) {
            bail!(
                "retina icon {file} must be exactly twice the size of `{name}` ({}x{})",
                base.image.width(),
                base.image.height()
            );
        }
    }

    Ok(IconSet { normal, retina })
}

fn generate(ctx: &Context, dir: &Path) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::SpriteGenerate);
    let config = &ctx.config.sprite;
    let icons = load_icons(ctx)?;
    if icons.normal.is_empty() {
        return Ok(report);
    }

    let sizes: Vec<_> = icons.normal.iter().map(|i| i.image.dimensions()).collect();
    let packed = pack::pack(&sizes, config.padding);

    let mut sheet = RgbaImage::new(packed.width, packed.height);
    let mut retina_sheet = (!icons.retina.is_empty())
        .then(|| RgbaImage::new(packed.width * 2, packed.height * 2));
    let mut items = Vec::with_capacity(icons.normal.len());

    for (icon, at) in icons.normal.iter().zip(&packed.placements) {
        imageops::replace(&mut sheet, &icon.image, at.x.into(), at.y.into());
        let retina = icons.retina.get(&icon.name);
        if let (Some(large), Some(target)) = (retina, retina_sheet.as_mut()) {
            imageops::replace(target, large, (at.x * 2).into(), (at.y * 2).into());
        }
        items.push(SpriteItem {
            name: icon.name.clone(),
            x: at.x,
            y: at.y,
            width: icon.image.width(),
            height: icon.image.height(),
            has_retina: retina.is_some(),
        });
    }

    let sheet_path = dir.join(&config.image_name);
    write_file(&sheet_path, raster::to_png(&DynamicImage::ImageRgba8(sheet))?)?;
    report.wrote(sheet_path);

    if let Some(retina_sheet) = retina_sheet {
        let path = dir.join(&config.retina_image_name);
        write_file(&path, raster::to_png(&DynamicImage::ImageRgba8(retina_sheet))?)?;
        report.wrote(path);
    }

    let css = stylesheet::render(
        &items,
        SheetRefs {
            image_path: &config.image_path,
            retina_image_path: &config.retina_image_path,
            width: packed.width,
            height: packed.height,
        },
    );
    let css_path = dir.join(&config.css_name);
    write_file(&css_path, css)?;
    report.wrote(css_path);

    crate::debug!("sprite"; "{} icons, {}x{}", items.len(), packed.width, packed.height);
    Ok(report)
}

fn images(ctx: &Context, dir: &Path) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::SpriteImages);
    let config = &ctx.config.sprite;
    let compression = ctx.target.flags.compress_images.then_some(Compression {
        jpeg_quality: ctx.config.images.jpeg_quality,
    });

    for name in [&config.image_name, &config.retina_image_name] {
        let source = dir.join(name);
        if source.is_file() {
            let out = ctx.target.paths.img.join(name);
            report.written.extend(emit_raster(&source, &out, compression)?);
        }
    }
    Ok(report)
}

fn style(ctx: &Context, dir: &Path) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::SpriteStyles);
    let css_name = &ctx.config.sprite.css_name;
    let source = dir.join(css_name);
    if !source.is_file() {
        return Ok(report);
    }

    let code = styles::finish(ctx, &read_to_string(&source)?, css_name)?;
    revision::emit(&ctx.target.paths.css, css_name, code.as_bytes(), &ctx.target, &mut report)?;
    crate::manifest::record(&ctx.target.manifest_path(), &report.manifest)?;
    Ok(report)
}

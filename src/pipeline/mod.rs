//! Asset pipelines.
//!
//! Each pipeline turns one class of source files into output under the
//! resolved [`Target`]. Pipelines are plain step functions returning a
//! [`PipelineReport`]; [`Pipeline::run`] wraps them with reporting so the
//! orchestrator and the watch bindings share one success/failure channel.
//!
//! ```text
//! Pipeline::Sprite
//!   ├── SpriteGenerate  pack icons into the temp workspace
//!   ├── SpriteImages    compress + webp into <img>
//!   └── SpriteStyles    prefix, webp rules, minify, hash into <css>
//! ```

mod copy;
mod images;
mod layout;
mod scripts;
mod sprite;
mod styles;
mod svg;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use lightningcss::targets::Targets;
use thiserror::Error;

use crate::config::Config;
use crate::core::{BuildMode, Target};
use crate::template::TemplateCache;

/// A schedulable unit: one task in the build sequence or one watch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    Styles,
    Scripts,
    Sprite,
    Layout,
    Images,
    Svg,
    Fonts,
    Resources,
}

impl Pipeline {
    /// Build order after clearing outputs.
    pub const SEQUENCE: [Self; 8] = [
        Self::Styles,
        Self::Scripts,
        Self::Sprite,
        Self::Layout,
        Self::Images,
        Self::Svg,
        Self::Fonts,
        Self::Resources,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Sprite => "sprite",
            Self::Layout => "layout",
            Self::Images => "images",
            Self::Svg => "svg",
            Self::Fonts => "fonts",
            Self::Resources => "resources",
        }
    }

    /// Run every stage, reporting each one. Stops at the first failing stage.
    pub fn run(self, ctx: &Context) -> Result<(), PipelineError> {
        match self {
            Self::Styles => stage(ctx, Stage::Styles, styles::run),
            Self::Scripts => stage(ctx, Stage::Scripts, scripts::run),
            Self::Layout => stage(ctx, Stage::Layout, layout::run),
            Self::Images => stage(ctx, Stage::Images, images::run),
            Self::Svg => stage(ctx, Stage::Svg, svg::run),
            Self::Fonts => stage(ctx, Stage::Fonts, copy::fonts),
            Self::Resources => stage(ctx, Stage::Resources, copy::resources),
            Self::Sprite => sprite::run(ctx),
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reported unit of work, named by its notification title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Styles,
    Scripts,
    Layout,
    Images,
    Svg,
    SpriteGenerate,
    SpriteImages,
    SpriteStyles,
    Fonts,
    Resources,
}

impl Stage {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Styles => "SASS",
            Self::Scripts => "JS",
            Self::Layout => "HTML",
            Self::Images => "IMAGES",
            Self::Svg => "SVG",
            Self::SpriteGenerate => "SPRITE",
            Self::SpriteImages => "SPRITE images",
            Self::SpriteStyles => "SPRITE styles",
            Self::Fonts => "FONTS",
            Self::Resources => "RESOURCES",
        }
    }

    /// Stages whose output browsers can swap without a reload.
    pub const fn is_stylesheet(self) -> bool {
        matches!(self, Self::Styles | Self::SpriteStyles)
    }

    /// Stages that only write into a temp workspace.
    pub const fn is_intermediate(self) -> bool {
        matches!(self, Self::SpriteGenerate)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What one stage produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub stage: Stage,
    /// Files written, absolute.
    pub written: Vec<PathBuf>,
    /// Inputs left alone because their output was up to date.
    pub skipped: usize,
    /// Entries this stage added to the revision manifest.
    pub manifest: BTreeMap<String, String>,
}

impl PipelineReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            written: Vec::new(),
            skipped: 0,
            manifest: BTreeMap::new(),
        }
    }

    pub fn wrote(&mut self, path: PathBuf) {
        self.written.push(path);
    }
}

/// A failed stage. The message carries the whole error chain.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", stage.title())]
pub struct PipelineError {
    pub stage: Stage,
    pub message: String,
}

impl PipelineError {
    pub fn new(stage: Stage, err: &anyhow::Error) -> Self {
        Self {
            stage,
            message: format!("{err:#}"),
        }
    }

    pub fn title(&self) -> &'static str {
        self.stage.title()
    }
}

/// Everything a pipeline run needs. Cheap to clone into watch workers.
#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub target: Arc<Target>,
    pub templates: Arc<TemplateCache>,
    /// Browser targets for prefixing, resolved once from `browsers`.
    pub css_targets: Targets,
}

impl Context {
    pub fn new(config: Arc<Config>, mode: BuildMode) -> Result<Self> {
        let target = Arc::new(Target::resolve(&config, mode));
        let css_targets =
            crate::asset::css::browser_targets(&config.browsers).map_err(anyhow::Error::msg)?;
        let templates = Arc::new(TemplateCache::new(config.root_join(&config.source.templates)));
        Ok(Self {
            config,
            target,
            templates,
            css_targets,
        })
    }
}

/// Run one stage and push its outcome through the report channel.
pub(crate) fn stage<F>(ctx: &Context, stage: Stage, f: F) -> Result<(), PipelineError>
where
    F: FnOnce(&Context) -> Result<PipelineReport>,
{
    crate::debug!("pipeline"; "{} started", stage.title());
    match f(ctx) {
        Ok(report) => {
            crate::report::success(&report, &ctx.target);
            Ok(())
        }
        Err(e) => {
            let err = PipelineError::new(stage, &e);
            crate::report::failure(&err, &ctx.target);
            Err(err)
        }
    }
}

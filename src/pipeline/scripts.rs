//! Scripts: bundle the entry point into `all.js`.

use anyhow::Result;

use super::{Context, PipelineReport, Stage};
use crate::asset::{js, revision};
use crate::bundle::{self, BundleOptions};

/// Bundle file name inside the target `js` directory.
pub const OUTPUT_NAME: &str = "all.js";

pub fn run(ctx: &Context) -> Result<PipelineReport> {
    let mut report = PipelineReport::new(Stage::Scripts);
    let entry = ctx.config.root_join(&ctx.config.source.js);
    let flags = ctx.target.flags;
    if !entry.is_file() {
        crate::debug!("scripts"; "no entry at {}", ctx.config.source.js.display());
        return Ok(report);
    }

    let options = BundleOptions {
        sourcemap: flags.sourcemap,
    };
    let mut code = bundle::bundle(&entry, &ctx.target.root, OUTPUT_NAME, options)?;
    if flags.minify {
        code = js::minify(&code)?;
    }

    revision::emit(
        &ctx.target.paths.js,
        OUTPUT_NAME,
        code.as_bytes(),
        &ctx.target,
        &mut report,
    )?;
    crate::manifest::record(&ctx.target.manifest_path(), &report.manifest)?;
    Ok(report)
}

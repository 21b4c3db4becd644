//! Task orchestration.
//!
//! ```text
//! [init scaffold] ─► clear outputs ─► styles ─► scripts ─► sprite ─► layout
//!   ─► images ─► svg ─► fonts ─► resources ─► clear temp ─► watch | archive
//! ```
//!
//! One-shot modes stop at the first failing pipeline. Development keeps
//! going: a broken stylesheet should not keep the server from starting.

pub mod archive;
pub mod clear;
mod watch;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::config::Config;
use crate::core::BuildMode;
use crate::pipeline::{Context, Pipeline, PipelineError};
use crate::{debug, log};

/// Run the whole invocation for `mode`.
pub fn run(config: Arc<Config>, mode: BuildMode) -> Result<()> {
    if mode == BuildMode::Init {
        crate::cli::init::scaffold(&config)?;
    }
    let ctx = Context::new(config, mode)?;

    // Watcher first: edits made during the initial build are kept
    let watcher = mode
        .is_watch()
        .then(|| watch::Watcher::start(&ctx))
        .transpose()?;

    let failures = build(&ctx)?;

    match watcher {
        Some(watcher) => watcher.serve(&ctx),
        None => {
            if let Some(first) = failures.into_iter().next() {
                return Err(first.into());
            }
            archive::create(&ctx.target)?;
            Ok(())
        }
    }
}

/// Clear, run every pipeline in order, then drop the temp directory.
///
/// Returns the pipelines that failed. Outside watch mode the sequence ends
/// at the first one.
pub fn build(ctx: &Context) -> Result<Vec<PipelineError>> {
    let mode = ctx.target.mode;
    let started = Instant::now();
    clear::outputs(&ctx.config, mode)?;

    let mut failures = Vec::new();
    for pipeline in Pipeline::SEQUENCE {
        debug!("build"; "{}", pipeline);
        if let Err(e) = pipeline.run(ctx) {
            failures.push(e);
            if !mode.is_watch() {
                break;
            }
        }
    }
    clear::temp(&ctx.config)?;

    match failures.len() {
        0 => log!("build"; "{} done in {:.2?}", mode, started.elapsed()),
        n => log!("build"; "{} finished with {} in {:.2?}", mode, crate::utils::plural_count(n, "error"), started.elapsed()),
    }
    Ok(failures)
}

/// The standalone `clear` task.
pub fn clear_task(config: &Config) -> Result<()> {
    clear::all(config).map(|_| ())
}

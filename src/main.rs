//! Frontkit - a front-end build runner.

mod asset;
mod bundle;
mod cli;
mod config;
mod core;
mod embed;
mod image;
mod lint;
mod logger;
mod manifest;
mod orchestrator;
mod pipeline;
mod report;
mod serve;
mod template;
mod utils;
mod workspace;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Task};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    if let Some(Task::Clear) = cli.task {
        return orchestrator::clear_task(&config);
    }

    let mode = cli.mode();
    if cli.has_conflicting_modes() {
        log!("mode"; "several mode flags given, using {}", mode);
    }
    orchestrator::run(Arc::new(config), mode)
}

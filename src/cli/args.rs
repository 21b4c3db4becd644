//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::BuildMode;

/// Front-end build runner: styles, scripts, templates, images and sprites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Build the distribution target and archive it to dist.zip
    #[arg(long)]
    pub dist: bool,

    /// Build the production target (minified, hashed) and archive it to build.zip
    #[arg(long)]
    pub build: bool,

    /// Create missing source folders, then build development output once
    #[arg(long)]
    pub init: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: frontkit.toml, optional)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Project root (default: directory of the config file, or the current directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Print debug output
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Standalone task to run instead of a build
    #[command(subcommand)]
    pub task: Option<Task>,
}

/// Standalone tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Delete dev, dist and build output plus the temp directory
    Clear,
}

impl Cli {
    /// Build mode selected by the flags (`--dist` > `--build` > `--init`).
    pub fn mode(&self) -> BuildMode {
        BuildMode::resolve(self.dist, self.build, self.init)
    }

    /// More than one mode flag was passed.
    pub fn has_conflicting_modes(&self) -> bool {
        [self.dist, self.build, self.init].iter().filter(|f| **f).count() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("frontkit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_is_development() {
        let cli = parse(&[]);
        assert_eq!(cli.mode(), BuildMode::Development);
        assert!(cli.task.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_mode_flags() {
        assert_eq!(parse(&["--dist"]).mode(), BuildMode::Distribution);
        assert_eq!(parse(&["--build"]).mode(), BuildMode::Production);
        assert_eq!(parse(&["--init"]).mode(), BuildMode::Init);
    }

    #[test]
    fn test_conflicting_flags_resolve_by_precedence() {
        let cli = parse(&["--init", "--build", "--dist"]);
        assert!(cli.has_conflicting_modes());
        assert_eq!(cli.mode(), BuildMode::Distribution);
        assert!(!parse(&["--build"]).has_conflicting_modes());
    }

    #[test]
    fn test_clear_task_with_global_options() {
        let cli = parse(&["clear", "--root", "site", "-V"]);
        assert_eq!(cli.task, Some(Task::Clear));
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_config_option() {
        let cli = parse(&["-C", "custom.toml", "--build"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_unknown_task_rejected() {
        let result = Cli::try_parse_from(["frontkit", "deploy"]);
        assert!(result.is_err());
    }
}

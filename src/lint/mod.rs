//! Built-in HTML and stylesheet linting.
//!
//! Rules only look at source text; nothing is fixed. A [`LintReport`]
//! collects violations per file and is finished with the config's
//! fail/strict switch, turning a non-empty report into a [`LintFailure`].

pub mod html;
pub mod style;

use std::collections::BTreeMap;

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::utils::{plural_count, plural_s};

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    pub rule: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(line: usize, col: usize, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            line,
            col,
            rule,
            message: message.into(),
        }
    }
}

/// Lint problems made a pipeline fail.
#[derive(Debug, Clone, Error)]
#[error("{linter}: {summary}")]
pub struct LintFailure {
    pub linter: &'static str,
    pub summary: String,
}

/// Violations grouped by file.
#[derive(Debug)]
pub struct LintReport {
    linter: &'static str,
    files: BTreeMap<String, Vec<Violation>>,
}

impl LintReport {
    pub fn new(linter: &'static str) -> Self {
        Self {
            linter,
            files: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, file: impl Into<String>, violations: Vec<Violation>) {
        if !violations.is_empty() {
            self.files.entry(file.into()).or_default().extend(violations);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} in {}",
            plural_count(self.count(), "problem"),
            plural_count(self.files.len(), "file")
        )
    }

    /// Print the report and fail when `fail` is set and anything was found.
    pub fn finish(self, fail: bool) -> Result<(), LintFailure> {
        if self.is_empty() {
            return Ok(());
        }
        self.print();
        if fail {
            return Err(LintFailure {
                linter: self.linter,
                summary: self.summary(),
            });
        }
        crate::log!(self.linter; "{}", self.summary());
        Ok(())
    }

    fn print(&self) {
        let count = self.count();
        eprintln!(
            "{} {}",
            self.linter.yellow().bold(),
            format!("({count} problem{})", plural_s(count)).dimmed()
        );
        for (file, violations) in &self.files {
            eprintln!("{}{}{}", "[".dimmed(), file.cyan(), "]".dimmed());
            for v in violations {
                eprintln!(
                    "  {} {} {}",
                    format!("{}:{}", v.line, v.col).dimmed(),
                    v.message,
                    v.rule.dimmed()
                );
            }
        }
    }
}

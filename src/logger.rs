//! Terminal output.
//!
//! - `log!` prints a line with a colored `[module]` prefix
//! - `debug!` does the same under `--verbose` only
//! - `WatchStatus` is the in-place status block used once watching
//!
//! ```ignore
//! log!("SASS"; "css/main.css");
//! debug!("watch"; "event: {}", path.display());
//! status_success("SASS", "css/main.css");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    collections::BTreeSet,
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Print `[module] message`, clearing any status residue on the line.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Stage titles (`SASS`, `SPRITE styles`) are upper case; modules are not.
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    let head = module.split(' ').next().unwrap_or(module);
    match head.to_ascii_lowercase().as_str() {
        "serve" | "reload" => prefix.bright_blue().bold().to_string(),
        "watch" | "build" | "archive" => prefix.bright_green().bold().to_string(),
        "error" | "lint" => prefix.bright_red().bold().to_string(),
        "warning" | "config" => prefix.yellow().bold().to_string(),
        _ if head.chars().all(|c| c.is_ascii_uppercase()) => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status
// ============================================================================

/// `HH:MM:SS` (UTC).
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

/// Status block for watch mode, rewritten in place after every run.
///
/// Bindings run concurrently, so a success from one must not hide a
/// failure from another: titles still failing are listed under each
/// success until their next clean run.
pub struct WatchStatus {
    last_lines: usize,
    failing: BTreeSet<String>,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self {
            last_lines: 0,
            failing: BTreeSet::new(),
        }
    }

    pub fn success(&mut self, title: &str, message: &str) {
        self.failing.remove(title);
        let text = self.with_failing(format!("{title}: {message}"));
        self.display(format!("{}", "✓".green()), &text);
    }

    pub fn unchanged(&mut self, title: &str, message: &str) {
        self.failing.remove(title);
        let text = self.with_failing(format!("{title}: {message}").dimmed().to_string());
        self.display(String::new(), &text);
    }

    pub fn error(&mut self, title: &str, detail: &str) {
        self.failing.insert(title.to_string());
        let summary = format!("{title} failed");
        let text = if detail.is_empty() {
            summary
        } else {
            format!("{}\n{}", summary.red(), detail)
        };
        self.display(format!("{}", "✗".red()), &text);
    }

    fn with_failing(&self, line: String) -> String {
        if self.failing.is_empty() {
            return line;
        }
        let titles: Vec<&str> = self.failing.iter().map(String::as_str).collect();
        format!("{line}\n  {} {}", "still failing:".red(), titles.join(", "))
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            let lines = u16::try_from(self.last_lines).unwrap_or(u16::MAX);
            execute!(stdout, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        if symbol.is_empty() {
            writeln!(stdout, "{timestamp} {message}").ok();
        } else {
            writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        }
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

pub fn status_success(title: &str, message: &str) {
    WATCH_STATUS.lock().success(title, message);
}

pub fn status_unchanged(title: &str, message: &str) {
    WATCH_STATUS.lock().unchanged(title, message);
}

pub fn status_error(title: &str, detail: &str) {
    WATCH_STATUS.lock().error(title, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(line_count("SASS: css/main.css"), 1);
        let message = "SASS failed\nError: expected \";\"\n  --> main.scss:3:1";
        assert_eq!(line_count(message), 3);
    }

    #[test]
    fn test_failures_tracked_per_title() {
        let mut status = WatchStatus::new();
        status.error("SASS", "boom");
        status.error("JS", "bad import");
        status.success("JS", "js/all.js");
        assert_eq!(status.failing.iter().collect::<Vec<_>>(), ["SASS"]);

        let line = status.with_failing("HTML: index.html".into());
        assert!(line.contains("SASS"));
        assert_eq!(line_count(&line), 2);

        status.unchanged("SASS", "nothing to do");
        assert!(status.failing.is_empty());
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_stage_titles_get_prefix() {
        assert!(colorize_prefix("SPRITE styles").contains("[SPRITE styles]"));
        assert!(colorize_prefix("watch").contains("[watch]"));
    }
}

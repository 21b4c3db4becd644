//! Event coalescing for the watch loop.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashSet;

use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 200;

/// Collects changed paths until events stop arriving for [`DEBOUNCE_MS`].
pub(super) struct Debouncer {
    window: Duration,
    changes: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::with_window(Duration::from_millis(DEBOUNCE_MS))
    }

    pub(super) fn with_window(window: Duration) -> Self {
        Self {
            window,
            changes: FxHashSet::default(),
            last_event: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // Metadata-only changes (mtime, chmod) come from our own reads
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            crate::debug!("watch"; "{:?} {}", event.kind, path.display());
            self.changes.insert(normalize_path(path));
            self.last_event = Some(Instant::now());
        }
    }

    /// Changed paths, once the window has passed since the last event.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        let last = self.last_event?;
        if last.elapsed() < self.window {
            return None;
        }
        self.last_event = None;
        let mut changes: Vec<_> = self.changes.drain().collect();
        changes.sort();
        (!changes.is_empty()).then_some(changes)
    }

    /// How long the loop may block before the next check.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(last) => self
                .window
                .saturating_sub(last.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(3600),
        }
    }
}

/// Editor artifacts and hidden files.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "swp" | "swo" | "tmp") || name.ends_with('~') || name.starts_with('.')
}

//! Watched source directories.

use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Keeps every source base attached, including ones created after start.
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    /// Absolute `dirs`, with any that sit inside another one dropped.
    pub(super) fn new(mut dirs: Vec<PathBuf>) -> Self {
        dirs.sort();
        dirs.dedup();
        let desired = dirs
            .iter()
            .filter(|d| !dirs.iter().any(|other| other != *d && d.starts_with(other)))
            .cloned()
            .collect();
        Self {
            desired,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }
            match watcher.watch(path, RecursiveMode::Recursive) {
                Ok(()) => {
                    crate::debug!("watch"; "watching {}", path.display());
                    self.attached.insert(path.clone());
                }
                Err(e) => crate::debug!("watch"; "cannot watch {}: {}", path.display(), e),
            }
        }
    }

    pub(super) fn attached(&self) -> usize {
        self.attached.len()
    }
}

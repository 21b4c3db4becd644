//! Per-run scratch directories under the temp root.
//!
//! Each [`TempWorkspace`] owns a fresh `<temp>/<label>-<pid>-<n>` directory
//! and removes it on drop, so a failed sprite run leaves nothing behind and
//! two overlapping runs never share files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct TempWorkspace {
    dir: PathBuf,
}

impl TempWorkspace {
    pub fn create(temp_root: &Path, label: &str) -> Result<Self> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let dir = temp_root.join(format!("{label}-{}-{id}", std::process::id()));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        crate::debug!("temp"; "created {}", dir.display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            crate::log!("warning"; "failed to remove {}: {}", self.dir.display(), e);
        }
    }
}

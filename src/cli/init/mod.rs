//! Project scaffolding for `--init`.
//!
//! Creates the configured source folders. Existing folders and files are
//! left untouched, so running it again is a no-op.

mod structure;

use crate::{config::Config, log, utils::plural_count};
use anyhow::Result;

/// Create every missing source folder under the project root.
pub fn scaffold(config: &Config) -> Result<()> {
    let created = structure::create_structure(&config.root, &config.folders)?;

    if created.is_empty() {
        log!("init"; "source folders already exist");
    } else {
        for dir in &created {
            crate::debug!("init"; "created {}", config.root_relative(dir).display());
        }
        log!("init"; "created {}", plural_count(created.len(), "folder"));
    }
    Ok(())
}

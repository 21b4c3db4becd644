//! Shared helpers with no pipeline knowledge.

pub mod fs;
pub mod glob;
pub mod hash;
pub mod html;
pub mod mime;
pub mod path;
pub mod plural;

pub use plural::{plural_count, plural_s};

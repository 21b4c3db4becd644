//! Asset transformations shared by the pipelines.
//!
//! Each module wraps one concern so pipelines stay a list of steps:
//! CSS prefixing and minifying, script lowering, WebP rewrites, HTML
//! formatting and content-hashed naming.

pub mod beautify;
pub mod css;
pub mod js;
pub mod revision;
pub mod webp;

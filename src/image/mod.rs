//! Image processing.
//!
//! - [`raster`]: PNG/JPEG recompression and WebP copies
//! - [`svg`]: usvg normalization and `<symbol>` sprites

pub mod raster;
pub mod svg;

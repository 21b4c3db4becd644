//! `[beautify]` and `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [beautify]
//! indent_size = 4
//! indent_char = "\t"
//!
//! [images]
//! jpeg_quality = 75
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// HTML pretty-printing, applied outside development.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeautifyConfig {
    pub indent_size: usize,
    pub indent_char: char,
}

impl Default for BeautifyConfig {
    fn default() -> Self {
        Self {
            indent_size: 2,
            indent_char: ' ',
        }
    }
}

impl BeautifyConfig {
    /// One indentation level.
    pub fn unit(&self) -> String {
        std::iter::repeat_n(self.indent_char, self.indent_size).collect()
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !matches!(self.indent_char, ' ' | '\t') {
            diag.error(
                FieldPath::new("beautify.indent_char"),
                "expected a space or a tab",
            );
        }
    }
}

/// Raster recompression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { jpeg_quality: 80 }
    }
}

impl ImagesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error_with_hint(
                FieldPath::new("images.jpeg_quality"),
                format!("{} is out of range", self.jpeg_quality),
                "use a value between 1 and 100",
            );
        }
    }
}

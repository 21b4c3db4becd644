//! Type-safe config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A dotted path to a config key, as written in `frontkit.toml`.
///
/// ```ignore
/// diag.error(FieldPath::new("images.jpeg_quality"), "out of range");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Table the key lives in; top-level keys report under `root`.
    pub fn section(&self) -> &'static str {
        self.0.split_once('.').map_or("root", |(section, _)| section)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path() {
        const QUALITY: FieldPath = FieldPath::new("images.jpeg_quality");
        assert_eq!(QUALITY.as_str(), "images.jpeg_quality");
        assert!(format!("{QUALITY}").contains("`images.jpeg_quality`"));
        assert_eq!(QUALITY.section(), "images");
        assert_eq!(FieldPath::new("temp_dir").section(), "root");
    }
}

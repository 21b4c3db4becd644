//! `[sprite]` section configuration for the raster icon sprite.
//!
//! # Example
//!
//! ```toml
//! [sprite]
//! image_name = "icons-sprite.png"
//! image_path = "../img/icons-sprite.png"   # url() written into the stylesheet
//! retina_suffix = "@2x"                    # icons named `*@2x.png` go to the retina sheet
//! css_name = "icons.css"
//! padding = 2
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Sheet file name, written to the target `img` directory.
    pub image_name: String,
    pub retina_image_name: String,
    /// Sheet url as seen from the generated stylesheet.
    pub image_path: String,
    pub retina_image_path: String,
    /// File-stem suffix marking retina icons.
    pub retina_suffix: String,
    /// Stylesheet file name, written to the target `css` directory.
    pub css_name: String,
    /// Pixels between packed icons.
    pub padding: u32,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            image_name: "icons-sprite.png".into(),
            retina_image_name: "icons-sprite@2x.png".into(),
            image_path: "../img/icons-sprite.png".into(),
            retina_image_path: "../img/icons-sprite@2x.png".into(),
            retina_suffix: "@2x".into(),
            css_name: "icons.css".into(),
            padding: 2,
        }
    }
}

impl SpriteConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, name) in [
            (FieldPath::new("sprite.image_name"), &self.image_name),
            (FieldPath::new("sprite.retina_image_name"), &self.retina_image_name),
        ] {
            if !name.to_ascii_lowercase().ends_with(".png") {
                diag.error(field, "sprite sheets are written as PNG");
            }
        }
        if self.image_name == self.retina_image_name {
            diag.error(
                FieldPath::new("sprite.retina_image_name"),
                "must differ from `image_name`",
            );
        }
        if !self.css_name.ends_with(".css") {
            diag.error(FieldPath::new("sprite.css_name"), "must end with `.css`");
        }
        if self.retina_suffix.is_empty() {
            diag.error_with_hint(
                FieldPath::new("sprite.retina_suffix"),
                "must not be empty",
                "every icon would be treated as retina",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_sprite_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.sprite.image_name, "icons-sprite.png");
        assert_eq!(config.sprite.retina_suffix, "@2x");
        assert_eq!(config.sprite.padding, 2);
    }

    #[test]
    fn test_sprite_override() {
        let config = test_parse_config("[sprite]\npadding = 8\ncss_name = \"sprite.css\"");
        assert_eq!(config.sprite.padding, 8);
        assert_eq!(config.sprite.css_name, "sprite.css");
        assert_eq!(config.sprite.image_path, "../img/icons-sprite.png");
    }

    #[test]
    fn test_sprite_validate() {
        let mut diag = ConfigDiagnostics::new();
        SpriteConfig::default().validate(&mut diag);
        assert!(diag.is_empty());

        let bad = SpriteConfig {
            image_name: "icons.jpg".into(),
            retina_suffix: String::new(),
            ..SpriteConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        bad.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}

//! `icons.css` for a packed sheet.

use std::fmt::Write as _;

/// One icon as placed on the normal sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteItem {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub has_retina: bool,
}

/// Sheet-level inputs of the stylesheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetRefs<'a> {
    pub image_path: &'a str,
    pub retina_image_path: &'a str,
    /// Normal sheet size; retina sheets are scaled down to this.
    pub width: u32,
    pub height: u32,
}

const RETINA_QUERY: &str = "(-webkit-min-device-pixel-ratio: 2), (min-resolution: 192dpi)";

/// Class name for an icon file stem: `.icon-<name>`, with anything outside
/// `[A-Za-z0-9_-]` replaced by `-`.
pub fn class_name(stem: &str) -> String {
    let name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("icon-{name}")
}

fn offset(v: u32) -> String {
    if v == 0 { "0px".into() } else { format!("-{v}px") }
}

pub fn render(items: &[SpriteItem], sheet: SheetRefs<'_>) -> String {
    let mut css = String::new();
    for item in items {
        let _ = write!(
            css,
            ".{} {{\n  background-image: url({});\n  background-position: {} {};\n  width: {}px;\n  height: {}px;\n}}\n",
            class_name(&item.name),
            sheet.image_path,
            offset(item.x),
            offset(item.y),
            item.width,
            item.height,
        );
    }

    let retina: Vec<_> = items.iter().filter(|i| i.has_retina).collect();
    if !retina.is_empty() {
        let _ = writeln!(css, "@media {RETINA_QUERY} {{");
        for item in retina {
            let _ = write!(
                css,
                "  .{} {{\n    background-image: url({});\n    background-size: {}px {}px;\n  }}\n",
                class_name(&item.name),
                sheet.retina_image_path,
                sheet.width,
                sheet.height,
            );
        }
        css.push_str("}\n");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, x: u32, has_retina: bool) -> SpriteItem {
        SpriteItem {
            name: name.into(),
            x,
            y: 0,
            width: 16,
            height: 16,
            has_retina,
        }
    }

    const SHEET: SheetRefs<'static> = SheetRefs {
        image_path: "../img/icons-sprite.png",
        retina_image_path: "../img/icons-sprite@2x.png",
        width: 34,
        height: 16,
    };

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("home"), "icon-home");
        assert_eq!(class_name("arrow left.v2"), "icon-arrow-left-v2");
    }

    #[test]
    fn test_rules() {
        let css = render(&[item("home", 0, false), item("mail", 18, false)], SHEET);
        assert!(css.contains(
            ".icon-home {\n  background-image: url(../img/icons-sprite.png);\n  background-position: 0px 0px;\n  width: 16px;\n  height: 16px;\n}"
        ));
        assert!(css.contains("background-position: -18px 0px;"));
        assert!(!css.contains("@media"));
    }

    #[test]
    fn test_retina_block() {
        let css = render(&[item("home", 0, true), item("mail", 18, false)], SHEET);
        let media = &css[css.find("@media").unwrap()..];
        assert!(media.contains(".icon-home {"));
        assert!(!media.contains(".icon-mail"));
        assert!(media.contains("url(../img/icons-sprite@2x.png)"));
        assert!(media.contains("background-size: 34px 16px;"));
    }
}

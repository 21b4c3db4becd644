//! SVG normalization and `<symbol>` sprites.
//!
//! ```text
//! icon.svg ──► usvg (paths only, ids prefixed) ──► svg/icon.svg
//!                                              └─► <symbol id="icon"> in sprite.symbol.svg
//! ```

mod symbol;

pub use symbol::{SymbolSprite, to_symbol};

use anyhow::{Context, Result};

/// Normalize `content` with usvg, reducing it to plain paths. Every `id`
/// gets `id_prefix` so shapes from different files can live in one document.
pub fn normalize(content: &[u8], id_prefix: &str) -> Result<String> {
    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        id_prefix: Some(id_prefix.to_string()),
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&write_options))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRADIENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10">
  <defs><linearGradient id="g"><stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue"/></linearGradient></defs>
  <rect width="20" height="10" fill="url(#g)"/>
</svg>"##;

    #[test]
    fn test_normalize_keeps_view_box() {
        let svg = normalize(GRADIENT.as_bytes(), "logo-").unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 20 10\""), "{svg}");
    }

    #[test]
    fn test_normalize_prefixes_ids() {
        let svg = normalize(GRADIENT.as_bytes(), "logo-").unwrap();
        assert!(svg.contains("id=\"logo-"), "{svg}");
        assert!(svg.contains("url(#logo-"), "{svg}");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize(b"<html></html>", "x-").is_err());
    }
}

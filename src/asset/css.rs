//! Stylesheet post-processing with lightningcss.
//!
//! Compiled CSS goes through one parse: vendor prefixes for the configured
//! browserslist targets, then printed either readable or minified.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

/// Resolve browserslist queries into lightningcss targets.
pub fn browser_targets<S: AsRef<str>>(queries: &[S]) -> Result<Targets, String> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }
    let queries: Vec<&str> = queries.iter().map(|q| q.as_ref()).collect();
    let browsers = Browsers::from_browserslist(queries)
        .map_err(|e| format!("invalid browserslist query: {e}"))?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Prefix `css` for `targets`, minifying when asked.
///
/// `filename` only appears in error messages.
pub fn process(css: &str, filename: &str, targets: Targets, minify: bool) -> Result<String> {
    let options = ParserOptions {
        filename: filename.to_string(),
        ..ParserOptions::default()
    };
    let mut sheet =
        StyleSheet::parse(css, options).map_err(|e| anyhow!("{filename}: {e}"))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{filename}: {e}"))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{filename}: {e}"))?;

    let mut code = printed.code;
    if !minify && !code.ends_with('\n') {
        code.push('\n');
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_browsers() -> Targets {
        browser_targets(&["last 4 versions"]).unwrap()
    }

    #[test]
    fn test_browser_targets_valid() {
        assert!(browser_targets(&["last 4 versions"]).is_ok());
        assert!(browser_targets(&["> 1%", "not dead"]).is_ok());
    }

    #[test]
    fn test_browser_targets_invalid() {
        assert!(browser_targets(&["not a real query ???"]).is_err());
    }

    #[test]
    fn test_prefixes_added() {
        let out = process(
            ".a { user-select: none; }",
            "main.css",
            old_browsers(),
            false,
        )
        .unwrap();
        assert!(out.matches("user-select").count() > 1, "{out}");
    }

    #[test]
    fn test_minify() {
        let out = process(
            ".a {\n  color: red;\n}\n\n.b {\n  margin: 0 0 0 0;\n}\n",
            "main.css",
            Targets::default(),
            true,
        )
        .unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains(".a{color:red}"), "{out}");
    }

    #[test]
    fn test_readable_output_keeps_lines() {
        let out = process(".a{color:red}.b{color:blue}", "main.css", Targets::default(), false)
            .unwrap();
        assert!(out.lines().count() > 2);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = process(".a { color: red; ", "broken.css", Targets::default(), false);
        // lightningcss recovers from unclosed blocks, so only check it does not panic
        if let Err(e) = err {
            assert!(e.to_string().contains("broken.css"));
        }
    }
}

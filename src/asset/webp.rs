//! WebP reference rewriting for stylesheets and pages.
//!
//! Raster images are emitted twice (original + `.webp`). Stylesheets get a
//! `.webp <selector>` sibling after every rule that references a raster
//! url, for a `webp` class set on `<html>` by feature detection. Pages get
//! every raster `<img>` wrapped in a `<picture>` with a WebP `<source>`.
//!
//! ```text
//! .hero { background: url(../img/hero.jpg); }
//! .webp .hero { background: url(../img/hero.webp); }
//!
//! <img src="img/a.png" alt="">
//! <picture><source srcset="img/a.webp" type="image/webp"><img src="img/a.png" alt=""></picture>
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::utils::html::{TokenKind, tokenize};

const RASTER_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// At-rules whose body is a list of rules.
const NESTING_AT_RULES: [&str; 5] = ["@media", "@supports", "@layer", "@container", "@document"];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#).unwrap()
});

// =============================================================================
// URLs
// =============================================================================

/// `a/b.png?v=1` -> `a/b.webp?v=1` for raster urls, `None` otherwise.
pub fn webp_url(url: &str) -> Option<String> {
    if url.starts_with("data:") {
        return None;
    }
    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);
    let dot = path.rfind('.')?;
    let ext = &path[dot + 1..];
    if !RASTER_EXTENSIONS.iter().any(|r| ext.eq_ignore_ascii_case(r)) {
        return None;
    }
    Some(format!("{}.webp{suffix}", &path[..dot]))
}

/// Rewrite every raster `url(...)` in a declaration; `None` if there are none.
fn rewrite_urls(declaration: &str) -> Option<String> {
    let mut changed = false;
    let rewritten = URL_RE.replace_all(declaration, |caps: &Captures<'_>| {
        let (url, quote) = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(m), _, _) => (m.as_str(), "\""),
            (_, Some(m), _) => (m.as_str(), "'"),
            (_, _, Some(m)) => (m.as_str(), ""),
            _ => return caps[0].to_string(),
        };
        match webp_url(url) {
            Some(webp) => {
                changed = true;
                format!("url({quote}{webp}{quote})")
            }
            None => caps[0].to_string(),
        }
    });
    changed.then(|| rewritten.into_owned())
}

// =============================================================================
// CSS
// =============================================================================

/// Append `.webp` sibling rules for every rule with raster urls.
pub fn rewrite_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    rewrite_block(css, &mut out);
    out
}

fn rewrite_block(css: &str, out: &mut String) {
    let mut pos = 0;
    while pos < css.len() {
        let Some(open) = find_unquoted(css, pos, b'{') else {
            out.push_str(&css[pos..]);
            return;
        };
        let Some(close) = matching_brace(css, open) else {
            out.push_str(&css[pos..]);
            return;
        };

        // Statements like `@import ...;` before the block stay as they are
        let head_start = last_statement_end(css, pos, open);
        out.push_str(&css[pos..head_start]);

        let prelude = &css[head_start..open];
        let body = &css[open + 1..close];
        let stripped = strip_comments(prelude);
        let name = stripped.trim();

        if NESTING_AT_RULES
            .iter()
            .any(|at| name.get(..at.len()).is_some_and(|p| p.eq_ignore_ascii_case(at)))
        {
            out.push_str(prelude);
            out.push('{');
            rewrite_block(body, out);
            out.push('}');
        } else {
            out.push_str(&css[head_start..=close]);
            if !name.starts_with('@')
                && let Some(sibling) = webp_sibling(name, body)
            {
                out.push('\n');
                out.push_str(&sibling);
            }
        }
        pos = close + 1;
    }
}

/// `.webp <selector> { <raster declarations rewritten> }`.
fn webp_sibling(selector: &str, body: &str) -> Option<String> {
    let declarations: Vec<String> = split_top_level(body, b';')
        .into_iter()
        .filter_map(|decl| rewrite_urls(decl.trim()))
        .collect();
    if declarations.is_empty() {
        return None;
    }

    let selectors: Vec<String> = split_top_level(selector, b',')
        .into_iter()
        .map(|s| format!(".webp {}", s.trim()))
        .collect();

    Some(format!(
        "{} {{\n  {};\n}}",
        selectors.join(",\n"),
        declarations.join(";\n  ")
    ))
}

/// Next `needle` outside strings and comments.
fn find_unquoted(css: &str, from: usize, needle: u8) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_comment(css, i),
            b if b == needle => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_comment(css, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Start of the rule prelude ending at `open`: just after the last `;`
/// between `from` and `open`.
fn last_statement_end(css: &str, from: usize, open: usize) -> usize {
    let mut end = from;
    let mut i = from;
    while let Some(found) = find_unquoted(css, i, b';').filter(|&f| f < open) {
        end = found + 1;
        i = found + 1;
    }
    end
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(start) = text[pos..].find("/*").map(|i| pos + i) {
        out.push_str(&text[pos..start]);
        pos = skip_comment(text, start);
    }
    out.push_str(&text[pos..]);
    out
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_comment(css: &str, start: usize) -> usize {
    css[start + 2..]
        .find("*/")
        .map_or(css.len(), |i| start + 2 + i + 2)
}

/// Split on `sep` outside strings and parentheses.
fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b if b == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts.retain(|p| !p.trim().is_empty());
    parts
}

// =============================================================================
// HTML
// =============================================================================

/// Wrap raster `<img>` tags in `<picture>` with a WebP `<source>`.
///
/// Images already inside a `<picture>` are left alone.
pub fn wrap_pictures(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 8);
    let mut copied = 0;
    let mut picture_depth = 0usize;

    for token in tokenize(html) {
        match &token.kind {
            TokenKind::Start(tag) if tag.name.eq_ignore_ascii_case("picture") => {
                picture_depth += 1;
            }
            TokenKind::End(name) if name.eq_ignore_ascii_case("picture") => {
                picture_depth = picture_depth.saturating_sub(1);
            }
            TokenKind::Start(tag) if tag.name.eq_ignore_ascii_case("img") && picture_depth == 0 => {
                let Some(webp) = tag.attr_value("src").and_then(webp_url) else {
                    continue;
                };
                out.push_str(&html[copied..token.offset]);
                out.push_str("<picture><source srcset=\"");
                out.push_str(&webp);
                out.push_str("\" type=\"image/webp\">");
                out.push_str(token.raw);
                out.push_str("</picture>");
                copied = token.offset + token.raw.len();
            }
            _ => {}
        }
    }

    out.push_str(&html[copied..]);
    out
}

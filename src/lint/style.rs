//! Stylesheet rules for `.scss`, `.sass` and `.css` sources.
//!
//! Block rules (empty rulesets, nesting depth) only apply to brace syntax.
//! Comments, strings and `#{}` interpolation are blanked out before any
//! rule looks at the text, keeping byte offsets intact.

use std::sync::LazyLock;

use regex::Regex;

use super::Violation;
use crate::config::StyleLintConfig;
use crate::utils::html::LineIndex;

static IMPORTANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)!\s*important\b").unwrap());

/// Check `src`. `indented` selects the whitespace-significant `.sass` syntax.
pub fn lint(src: &str, indented: bool, config: &StyleLintConfig) -> Vec<Violation> {
    let masked = mask(src);
    let lines = LineIndex::new(src);
    let mut out = Vec::new();
    let mut report = |offset: usize, rule: &'static str, message: String| {
        let (line, col) = lines.line_col(offset);
        out.push(Violation::new(line, col, rule, message));
    };

    if config.no_important {
        for m in IMPORTANT_RE.find_iter(&masked) {
            report(m.start(), "no-important", "unexpected !important".to_string());
        }
    }

    let mut offset = 0;
    for line in src.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let indent_len = content.len() - content.trim_start_matches([' ', '\t']).len();
        let indent = &content[..indent_len];

        if config.no_trailing_whitespace && content.len() > indent_len {
            let trimmed = content.trim_end_matches([' ', '\t']);
            if trimmed.len() < content.len() {
                report(
                    offset + trimmed.len(),
                    "no-trailing-whitespace",
                    "unexpected trailing whitespace".to_string(),
                );
            }
        }
        if config.no_mixed_indentation && indent.contains('\t') && indent.contains(' ') {
            report(
                offset,
                "no-mixed-indentation",
                "do not mix tabs and spaces for indentation".to_string(),
            );
        }
        offset += line.len();
    }

    if !indented {
        blocks(&masked, config, &mut report);
    }

    out.sort_by_key(|v| (v.line, v.col));
    out
}

fn blocks<F>(masked: &str, config: &StyleLintConfig, report: &mut F)
where
    F: FnMut(usize, &'static str, String),
{
    let bytes = masked.as_bytes();
    // Open blocks as (offset, is_rule). At-rules like @media do not count
    // towards nesting depth.
    let mut stack: Vec<(usize, bool)> = Vec::new();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => {
                let is_rule = !prelude(masked, i).starts_with('@');
                let depth = stack.iter().filter(|(_, rule)| *rule).count();
                if is_rule && config.max_nesting_depth > 0 && depth > config.max_nesting_depth {
                    report(
                        i,
                        "max-nesting-depth",
                        format!(
                            "expected nesting depth to be no more than {}",
                            config.max_nesting_depth
                        ),
                    );
                }
                stack.push((i, is_rule));
            }
            b'}' => {
                if let Some((open, _)) = stack.pop() {
                    let inner = &masked[open + 1..i];
                    if config.no_empty_rulesets && inner.trim().is_empty() {
                        report(open, "no-empty-rulesets", "unexpected empty block".to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

/// Text between the previous statement boundary and the `{` at `brace`.
fn prelude(masked: &str, brace: usize) -> &str {
    let head = &masked[..brace];
    let start = head.rfind([';', '{', '}']).map_or(0, |i| i + 1);
    head[start..].trim()
}

/// Blank comments, string contents and interpolations with spaces.
fn mask(src: &str) -> String {
    let bytes = src.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = src[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && (i == 0 || bytes[i - 1] != b':') => {
                let end = src[i..].find('\n').map_or(bytes.len(), |p| i + p);
                blank(&mut out, i, end);
                i = end;
            }
            quote @ (b'"' | b'\'') => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != quote && bytes[j] != b'\n' {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                let end = j.min(bytes.len());
                blank(&mut out, i + 1, end);
                i = end + 1;
            }
            b'#' if bytes.get(i + 1) == Some(&b'{') => {
                let mut depth = 0usize;
                let mut j = i + 1;
                while j < bytes.len() {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    j += 1;
                }
                let end = (j + 1).min(bytes.len());
                blank(&mut out, i, end);
                i = end;
            }
            _ => i += 1,
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn blank(out: &mut [u8], from: usize, to: usize) {
    for b in &mut out[from..to] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(src: &str) -> Vec<&'static str> {
        lint(src, false, &StyleLintConfig::default())
            .into_iter()
            .map(|v| v.rule)
            .collect()
    }

    #[test]
    fn test_clean_source() {
        let src = ".a {\n  color: red;\n\n  &:hover {\n    color: blue;\n  }\n}\n";
        assert!(rules(src).is_empty(), "{:?}", rules(src));
    }

    #[test]
    fn test_important() {
        assert_eq!(rules(".a { color: red !important; }"), ["no-important"]);
        assert_eq!(rules(".a { color: red ! IMPORTANT; }"), ["no-important"]);
        assert!(rules(".a { content: \"!important\"; }").is_empty());
        assert!(rules("// color: red !important;\n.a { color: red; }").is_empty());
    }

    #[test]
    fn test_empty_block() {
        let found = lint(".a {\n  color: red;\n}\n.b {\n  /* todo */\n}\n", false, &StyleLintConfig::default());
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].rule, found[0].line), ("no-empty-rulesets", 4));
    }

    #[test]
    fn test_trailing_whitespace() {
        let found = lint(".a {\n  color: red;  \n}\n", false, &StyleLintConfig::default());
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].rule, found[0].line, found[0].col), ("no-trailing-whitespace", 2, 14));
    }

    #[test]
    fn test_mixed_indentation() {
        assert_eq!(rules(".a {\n \tcolor: red;\n}"), ["no-mixed-indentation"]);
        assert!(rules(".a {\n\tcolor: red;\n}").is_empty());
    }

    #[test]
    fn test_nesting_depth() {
        let config = StyleLintConfig {
            max_nesting_depth: 1,
            ..StyleLintConfig::default()
        };
        let src = ".a { .b { .c { color: red; } } }";
        let found = lint(src, false, &config);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "max-nesting-depth");

        let media = "@media print { .a { .b { color: red; } } }";
        assert!(lint(media, false, &config).is_empty());
    }

    #[test]
    fn test_interpolation_ignored() {
        assert!(rules(".a-#{$name} {\n  width: #{$w}px;\n}\n").is_empty());
    }

    #[test]
    fn test_indented_syntax_skips_block_rules() {
        let src = ".a\n  color: red !important\n";
        let found = lint(src, true, &StyleLintConfig::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "no-important");
    }

    #[test]
    fn test_url_double_slash_kept() {
        assert!(rules(".a { background: url(http://x.test/a.png); }").is_empty());
    }
}

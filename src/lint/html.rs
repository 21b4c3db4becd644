//! HTML rules, named after their htmlhint counterparts.

use rustc_hash::{FxHashMap, FxHashSet};

use super::Violation;
use crate::config::{HrefPolicy, HtmlLintConfig, IndentPolicy};
use crate::utils::html::{
    LineIndex, Tag, Token, TokenKind, is_raw_text_element, is_void_element, tokenize,
};

/// SVG attributes that are camelCase by definition.
const CAMEL_CASE_ATTRS: &[&str] = &["viewBox", "preserveAspectRatio", "gradientUnits", "patternUnits"];

/// Attributes whose empty value is an error for `src-not-empty`.
const SOURCE_ATTRS: &[(&str, &str)] = &[
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("embed", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("source", "src"),
    ("track", "src"),
    ("link", "href"),
    ("object", "data"),
];

/// Check `src` against every enabled rule. Violations come back in
/// source order.
pub fn lint(src: &str, config: &HtmlLintConfig) -> Vec<Violation> {
    let tokens = tokenize(src);
    let lines = LineIndex::new(src);
    let mut linter = Linter {
        config,
        lines: &lines,
        out: Vec::new(),
    };

    linter.doctype(&tokens);
    linter.tags(&tokens);
    if config.tag_pair {
        linter.tag_pair(&tokens);
    }
    if config.title_require {
        linter.title(&tokens);
    }
    if config.space_tab_mixed_disabled != IndentPolicy::Off {
        linter.indentation(src, config.space_tab_mixed_disabled);
    }

    linter.out.sort_by_key(|v| (v.line, v.col));
    linter.out
}

struct Linter<'a> {
    config: &'a HtmlLintConfig,
    lines: &'a LineIndex,
    out: Vec<Violation>,
}

impl Linter<'_> {
    fn report(&mut self, offset: usize, rule: &'static str, message: impl Into<String>) {
        let (line, col) = self.lines.line_col(offset);
        self.out.push(Violation::new(line, col, rule, message));
    }

    fn doctype(&mut self, tokens: &[Token<'_>]) {
        if !self.config.doctype_html5 {
            return;
        }
        let first = tokens.iter().find_map(|t| match t.kind {
            TokenKind::Doctype(inner) => Some((t.offset, inner)),
            _ => None,
        });
        if let Some((offset, inner)) = first {
            let normalized: Vec<&str> = inner.split_whitespace().collect();
            let is_html5 = normalized.len() == 2
                && normalized[0].eq_ignore_ascii_case("doctype")
                && normalized[1].eq_ignore_ascii_case("html");
            let is_doctype = inner
                .get(..7)
                .is_some_and(|s| s.eq_ignore_ascii_case("doctype"));
            if is_doctype && !is_html5 {
                self.report(offset, "doctype-html5", "invalid doctype, use <!DOCTYPE html>");
            }
        }
    }

    /// Per-tag and per-attribute rules.
    fn tags(&mut self, tokens: &[Token<'_>]) {
        let mut ids: FxHashMap<String, usize> = FxHashMap::default();
        let mut in_raw_text = false;

        for token in tokens {
            match &token.kind {
                TokenKind::Text(text) if self.config.spec_char_escape && !in_raw_text => {
                    self.special_chars(token.offset, text);
                }
                _ => {}
            }
            in_raw_text = matches!(&token.kind, TokenKind::Start(tag) if is_raw_text_element(&tag.lower_name()));

            match &token.kind {
                TokenKind::Start(tag) => {
                    self.start_tag(token.offset, tag);
                    if self.config.id_unique {
                        if let Some(id) = tag.attr_value("id").filter(|id| !id.is_empty()) {
                            if ids.insert(id.to_string(), token.offset).is_some() {
                                self.report(
                                    token.offset,
                                    "id-unique",
                                    format!("id \"{id}\" is used more than once"),
                                );
                            }
                        }
                    }
                }
                TokenKind::End(name) => {
                    if self.config.tagname_lowercase && has_uppercase(name) {
                        self.report(
                            token.offset,
                            "tagname-lowercase",
                            format!("tag name </{name}> must be lowercase"),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn start_tag(&mut self, offset: usize, tag: &Tag<'_>) {
        let config = self.config;
        let name = tag.lower_name();

        if config.tagname_lowercase && has_uppercase(tag.name) {
            self.report(
                offset,
                "tagname-lowercase",
                format!("tag name <{}> must be lowercase", tag.name),
            );
        }
        if config.style_disabled && name == "style" {
            self.report(offset, "style-disabled", "<style> tags cannot be used");
        }
        if config.tag_self_close && is_void_element(&name) && !tag.self_closing {
            self.report(
                offset,
                "tag-self-close",
                format!("empty tag <{name}> must be self closed"),
            );
        }
        if let Some(href) = tag.attr("href") {
            self.href(href.offset, href.value.unwrap_or(""));
        }

        let mut seen = FxHashSet::default();
        for attr in &tag.attrs {
            let attr_name = attr.name.to_ascii_lowercase();
            let value = attr.value.unwrap_or("");

            if config.attr_lowercase
                && has_uppercase(attr.name)
                && !CAMEL_CASE_ATTRS.contains(&attr.name)
            {
                self.report(
                    attr.offset,
                    "attr-lowercase",
                    format!("attribute name [{}] must be lowercase", attr.name),
                );
            }
            if config.attr_value_double_quotes && attr.value.is_some() && attr.quote != Some('"') {
                self.report(
                    attr.offset,
                    "attr-value-double-quotes",
                    format!("value of attribute [{}] must be in double quotes", attr.name),
                );
            }
            if config.attr_value_not_empty && attr.value.is_none() {
                self.report(
                    attr.offset,
                    "attr-value-not-empty",
                    format!("attribute [{}] must have a value", attr.name),
                );
            }
            if config.attr_no_duplication && !seen.insert(attr_name.clone()) {
                self.report(
                    attr.offset,
                    "attr-no-duplication",
                    format!("duplicate attribute [{}]", attr.name),
                );
            }
            if config.attr_no_unnecessary_whitespace && attr.spaced {
                self.report(
                    attr.offset,
                    "attr-no-unnecessary-whitespace",
                    format!("no spaces allowed around '=' in [{}]", attr.name),
                );
            }
            if config.attr_unsafe_chars && value.chars().any(is_unsafe_char) {
                self.report(
                    attr.offset,
                    "attr-unsafe-chars",
                    format!("value of attribute [{}] contains unsafe characters", attr.name),
                );
            }
            if config.inline_style_disabled && attr_name == "style" {
                self.report(attr.offset, "inline-style-disabled", "inline style cannot be used");
            }
            if config.inline_script_disabled
                && (attr_name.starts_with("on")
                    || (matches!(attr_name.as_str(), "href" | "src")
                        && value.trim_start().to_ascii_lowercase().starts_with("javascript:")))
            {
                self.report(
                    attr.offset,
                    "inline-script-disabled",
                    format!("inline script cannot be used in [{}]", attr.name),
                );
            }
            if config.id_class_ad_disabled && matches!(attr_name.as_str(), "id" | "class") {
                let words = if attr_name == "class" {
                    value.split_whitespace().collect()
                } else {
                    vec![value]
                };
                if words.into_iter().any(is_ad_word) {
                    self.report(
                        attr.offset,
                        "id-class-ad-disabled",
                        format!("[{attr_name}] value must not look like an advertisement"),
                    );
                }
            }
        }

        if config.src_not_empty {
            for (element, attr_name) in SOURCE_ATTRS {
                if name == *element {
                    if let Some(attr) = tag.attr(attr_name) {
                        if attr.value.unwrap_or("").trim().is_empty() {
                            self.report(
                                attr.offset,
                                "src-not-empty",
                                format!("[{attr_name}] of <{name}> must have a value"),
                            );
                        }
                    }
                }
            }
        }

        if config.alt_require {
            let needs_alt = match name.as_str() {
                "img" => true,
                "area" => tag.attr("href").is_some(),
                "input" => tag
                    .attr_value("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("image")),
                _ => false,
            };
            if needs_alt && tag.attr("alt").is_none() {
                self.report(offset, "alt-require", format!("<{name}> must have an alt attribute"));
            }
        }
    }

    fn href(&mut self, offset: usize, value: &str) {
        let expected = match self.config.href_abs_or_rel {
            HrefPolicy::Off => return,
            HrefPolicy::Abs if !has_scheme(value) => "absolute",
            HrefPolicy::Rel if is_http_url(value) => "relative",
            _ => return,
        };
        self.report(
            offset,
            "href-abs-or-rel",
            format!("href \"{value}\" must be {expected}"),
        );
    }

    /// Unescaped `<`, `>` and ` & ` in text content.
    fn special_chars(&mut self, offset: usize, text: &str) {
        let bytes = text.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            let bare_amp = b == b'&'
                && i > 0
                && bytes[i - 1] == b' '
                && bytes.get(i + 1) == Some(&b' ');
            if b == b'<' || b == b'>' || bare_amp {
                self.report(
                    offset + i,
                    "spec-char-escape",
                    format!("special character '{}' must be escaped", b as char),
                );
            }
        }
    }

    fn tag_pair(&mut self, tokens: &[Token<'_>]) {
        let mut stack: Vec<(String, usize)> = Vec::new();
        for token in tokens {
            match &token.kind {
                TokenKind::Start(tag) if !tag.is_void() => {
                    stack.push((tag.lower_name(), token.offset));
                }
                TokenKind::End(name) => {
                    let name = name.to_ascii_lowercase();
                    match stack.iter().rposition(|(open, _)| *open == name) {
                        Some(pos) => {
                            for (unclosed, offset) in stack.drain(pos..).skip(1).collect::<Vec<_>>() {
                                self.report(
                                    offset,
                                    "tag-pair",
                                    format!("<{unclosed}> has no matching end tag"),
                                );
                            }
                        }
                        None => self.report(
                            token.offset,
                            "tag-pair",
                            format!("</{name}> has no matching start tag"),
                        ),
                    }
                }
                _ => {}
            }
        }
        for (unclosed, offset) in stack {
            self.report(offset, "tag-pair", format!("<{unclosed}> has no matching end tag"));
        }
    }

    fn title(&mut self, tokens: &[Token<'_>]) {
        let head = tokens
            .iter()
            .position(|t| matches!(&t.kind, TokenKind::Start(tag) if tag.lower_name() == "head"));
        let Some(head) = head else {
            // fragments without a <head> are not full documents
            return;
        };

        let mut in_title = false;
        let mut has_title = false;
        for token in &tokens[head + 1..] {
            match &token.kind {
                TokenKind::Start(tag) if tag.lower_name() == "title" => in_title = true,
                TokenKind::Text(text) if in_title && !text.trim().is_empty() => has_title = true,
                TokenKind::End(name) if name.eq_ignore_ascii_case("title") => in_title = false,
                TokenKind::End(name) if name.eq_ignore_ascii_case("head") => break,
                _ => {}
            }
        }
        if !has_title {
            self.report(tokens[head].offset, "title-require", "<title> must be present in <head>");
        }
    }

    fn indentation(&mut self, src: &str, policy: IndentPolicy) {
        let mut offset = 0;
        for line in src.split_inclusive('\n') {
            let indent: &str = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
            let has_tab = indent.contains('\t');
            let has_space = indent.contains(' ');
            let message = match policy {
                IndentPolicy::Space if has_tab => Some("indent with spaces only"),
                IndentPolicy::Tab if has_space => Some("indent with tabs only"),
                IndentPolicy::Mixed if has_tab && has_space => {
                    Some("do not mix tabs and spaces for indentation")
                }
                _ => None,
            };
            if let Some(message) = message {
                self.report(offset, "space-tab-mixed-disabled", message);
            }
            offset += line.len();
        }
    }
}

/// `scheme:` prefix of word characters, as in `mailto:` or `https:`.
fn has_scheme(value: &str) -> bool {
    value.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn has_uppercase(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
}

/// `ad`, `ad-top`, `side_ad`, but not `add` or `header`.
fn is_ad_word(word: &str) -> bool {
    word.split(['-', '_']).any(|part| part.eq_ignore_ascii_case("ad"))
}

fn is_unsafe_char(c: char) -> bool {
    matches!(c,
        '\u{0}'..='\u{8}'
        | '\u{b}'
        | '\u{c}'
        | '\u{e}'..='\u{1f}'
        | '\u{7f}'..='\u{9f}'
        | '\u{ad}'
        | '\u{600}'..='\u{604}'
        | '\u{70f}'
        | '\u{17b4}'
        | '\u{17b5}'
        | '\u{200c}'..='\u{200f}'
        | '\u{2028}'..='\u{202f}'
        | '\u{2060}'..='\u{206f}'
        | '\u{feff}'
        | '\u{fff0}'..='\u{ffff}')
}

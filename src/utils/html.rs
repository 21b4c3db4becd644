//! HTML tokenizer and element classification.
//!
//! A forgiving, position-preserving tokenizer: every token keeps its raw
//! source slice and byte offset, so callers can report line numbers
//! (lint), re-emit the original text (beautify), or splice replacements
//! into the source (picture wrapping).
//!
//! Script and style bodies are returned as a single raw `Text` token.

// =============================================================================
// Tokens
// =============================================================================

/// One attribute as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: &'a str,
    /// `None` for boolean attributes.
    pub value: Option<&'a str>,
    /// Quote character around the value, if any.
    pub quote: Option<char>,
    /// Whitespace before or after `=`.
    pub spaced: bool,
    /// Byte offset of the attribute name.
    pub offset: usize,
}

/// A start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Name as written (not case-folded).
    pub name: &'a str,
    pub attrs: Vec<Attr<'a>>,
    /// Written as `<tag/>`.
    pub self_closing: bool,
}

impl Tag<'_> {
    /// Lowercase tag name.
    pub fn lower_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// First attribute named `name` (ASCII case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&Attr<'_>> {
        self.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Value of `name`, empty for boolean attributes.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|a| a.value.unwrap_or(""))
    }

    /// Has no content or end tag.
    pub fn is_void(&self) -> bool {
        self.self_closing || is_void_element(&self.lower_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `<!...>` or `<?...>`, inner text without the delimiters.
    Doctype(&'a str),
    /// `<!-- ... -->`, inner text.
    Comment(&'a str),
    Start(Tag<'a>),
    /// End tag name as written.
    End(&'a str),
    Text(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Exact source text of the token.
    pub raw: &'a str,
    /// Byte offset into the source.
    pub offset: usize,
}

/// Split `src` into tokens. Never fails: malformed markup degrades to text.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < len {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let rest = &src[pos..];
        let next = bytes.get(pos + 1).copied();
        let parsed = if rest.starts_with("<!--") {
            let (inner_end, end) = match rest[4..].find("-->") {
                Some(i) => (pos + 4 + i, pos + 4 + i + 3),
                None => (len, len),
            };
            Some((TokenKind::Comment(&src[pos + 4..inner_end]), end))
        } else if next == Some(b'!') || next == Some(b'?') {
            let (inner_end, end) = match find_byte(bytes, pos, b'>') {
                Some(i) => (i, i + 1),
                None => (len, len),
            };
            Some((TokenKind::Doctype(&src[pos + 2..inner_end]), end))
        } else if next == Some(b'/') && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic) {
            let (inner_end, end) = match find_byte(bytes, pos, b'>') {
                Some(i) => (i, i + 1),
                None => (len, len),
            };
            let name = src[pos + 2..inner_end]
                .split(|c: char| c.is_ascii_whitespace())
                .next()
                .unwrap_or_default();
            Some((TokenKind::End(name), end))
        } else if next.is_some_and(|b| b.is_ascii_alphabetic()) {
            let (tag, end) = parse_tag(src, pos);
            Some((TokenKind::Start(tag), end))
        } else {
            None
        };

        let Some((kind, end)) = parsed else {
            pos += 1;
            continue;
        };

        if text_start < pos {
            tokens.push(Token {
                kind: TokenKind::Text(&src[text_start..pos]),
                raw: &src[text_start..pos],
                offset: text_start,
            });
        }

        let raw_text_name = match &kind {
            TokenKind::Start(tag) if !tag.self_closing => {
                let name = tag.lower_name();
                is_raw_text_element(&name).then_some(name)
            }
            _ => None,
        };

        tokens.push(Token {
            kind,
            raw: &src[pos..end],
            offset: pos,
        });
        pos = end;
        text_start = end;

        if let Some(name) = raw_text_name {
            let close = find_closing_tag(src, end, &name).unwrap_or(len);
            if close > end {
                tokens.push(Token {
                    kind: TokenKind::Text(&src[end..close]),
                    raw: &src[end..close],
                    offset: end,
                });
            }
            pos = close;
            text_start = close;
        }
    }

    if text_start < len {
        tokens.push(Token {
            kind: TokenKind::Text(&src[text_start..]),
            raw: &src[text_start..],
            offset: text_start,
        });
    }

    tokens
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..].iter().position(|b| *b == needle).map(|i| from + i)
}

/// Offset of `</name` at or after `from`, ASCII case-insensitive.
fn find_closing_tag(src: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = from;
    while let Some(off) = src[i..].find("</") {
        let at = i + off;
        let candidate = &bytes[at + 2..];
        if candidate.len() >= name.len()
            && candidate[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        {
            return Some(at);
        }
        i = at + 2;
    }
    None
}

fn parse_tag(src: &str, pos: usize) -> (Tag<'_>, usize) {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let is_space = |i: usize| bytes[i].is_ascii_whitespace();

    let mut i = pos + 1;
    let name_start = i;
    while i < len && !is_space(i) && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }
    let name = &src[name_start..i];

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < len && is_space(i) {
            i += 1;
        }
        if i >= len {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                if bytes.get(i + 1) == Some(&b'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
                continue;
            }
            b'=' => {
                // Stray `=` without a name
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < len
            && !is_space(i)
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
        {
            i += 1;
        }
        let attr_name = &src[attr_start..i];

        let mut j = i;
        while j < len && is_space(j) {
            j += 1;
        }
        if j < len && bytes[j] == b'=' {
            let mut k = j + 1;
            while k < len && is_space(k) {
                k += 1;
            }
            let spaced = j > i || k > j + 1;
            let (value, quote, end) = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let q = bytes[k];
                let value_start = k + 1;
                let value_end = find_byte(bytes, value_start, q).unwrap_or(len);
                (
                    &src[value_start..value_end],
                    Some(q as char),
                    (value_end + 1).min(len),
                )
            } else {
                let mut value_end = k;
                while value_end < len && !is_space(value_end) && bytes[value_end] != b'>' {
                    value_end += 1;
                }
                (&src[k..value_end], None, value_end)
            };
            attrs.push(Attr {
                name: attr_name,
                value: Some(value),
                quote,
                spaced,
                offset: attr_start,
            });
            i = end;
        } else {
            attrs.push(Attr {
                name: attr_name,
                value: None,
                quote: None,
                spaced: false,
                offset: attr_start,
            });
        }
    }

    (
        Tag {
            name,
            attrs,
            self_closing,
        },
        i,
    )
}

// =============================================================================
// Positions
// =============================================================================

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&s| s <= offset).max(1);
        (line, offset - self.starts[line - 1] + 1)
    }
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (no content, no end tag).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content is not markup).
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Whitespace inside these elements is significant.
#[inline]
pub fn is_preformatted_element(tag: &str) -> bool {
    matches!(tag, "pre" | "textarea")
}

/// Phrasing elements kept on the surrounding line when formatting.
#[inline]
pub fn is_inline_element(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "button"
            | "cite"
            | "code"
            | "data"
            | "del"
            | "dfn"
            | "em"
            | "i"
            | "img"
            | "input"
            | "ins"
            | "kbd"
            | "label"
            | "mark"
            | "picture"
            | "q"
            | "s"
            | "samp"
            | "select"
            | "small"
            | "source"
            | "span"
            | "strong"
            | "sub"
            | "sup"
            | "svg"
            | "use"
            | "time"
            | "u"
            | "var"
            | "wbr"
    )
}

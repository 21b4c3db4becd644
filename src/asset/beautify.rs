//! HTML pretty-printing.
//!
//! Block elements go on their own line, one indent unit per nesting level.
//! Inline elements and text flow on the current line with whitespace
//! collapsed. A block holding only inline content stays on one line.
//! `pre`/`textarea` are copied verbatim; `script`/`style` bodies are
//! re-indented as a whole.

use crate::utils::html::{
    Token, TokenKind, is_inline_element, is_preformatted_element, is_raw_text_element, tokenize,
};

/// Reformat `html` with `unit` as one indent step.
pub fn beautify(html: &str, unit: &str) -> String {
    let tokens = tokenize(html);
    let mut f = Formatter::new(unit);
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        match &token.kind {
            TokenKind::Doctype(_) | TokenKind::Comment(_) => f.block(token.raw),
            TokenKind::Text(text) => f.text(text),
            TokenKind::Start(tag) => {
                let name = tag.lower_name();
                if is_preformatted_element(&name) && !tag.is_void() {
                    let end = matching_end(&tokens, i, &name);
                    let stop = tokens
                        .get(end)
                        .map_or(html.len(), |t| t.offset + t.raw.len());
                    f.inline(&html[token.offset..stop]);
                    i = end + 1;
                    continue;
                }
                if is_raw_text_element(&name) && !tag.is_void() {
                    i = f.raw_text(&tokens, i);
                    continue;
                }
                if is_inline_element(&name) {
                    f.inline(token.raw);
                } else if tag.is_void() {
                    f.block(token.raw);
                } else {
                    f.open(token.raw);
                }
            }
            TokenKind::End(name) => {
                if is_inline_element(&name.to_ascii_lowercase()) {
                    f.inline(token.raw);
                } else {
                    f.close(token.raw);
                }
            }
        }
        i += 1;
    }

    f.finish()
}

/// Index of the end tag closing the element started at `start`.
fn matching_end(tokens: &[Token<'_>], start: usize, name: &str) -> usize {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match &token.kind {
            TokenKind::Start(tag) if tag.lower_name() == name && !tag.is_void() => depth += 1,
            TokenKind::End(end) if end.eq_ignore_ascii_case(name) => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}

struct Formatter<'u> {
    unit: &'u str,
    out: String,
    level: usize,
    /// Pending inline run.
    line: String,
    line_level: usize,
    /// The pending run starts with a block start tag that has not closed.
    line_opens_block: bool,
    opener_len: usize,
}

impl<'u> Formatter<'u> {
    fn new(unit: &'u str) -> Self {
        Self {
            unit,
            out: String::new(),
            level: 0,
            line: String::new(),
            line_level: 0,
            line_opens_block: false,
            opener_len: 0,
        }
    }

    fn push_line(&mut self, level: usize, text: &str) {
        for _ in 0..level {
            self.out.push_str(self.unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn flush(&mut self) {
        let line = std::mem::take(&mut self.line);
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.push_line(self.line_level, trimmed);
        }
        self.line_opens_block = false;
    }

    fn block(&mut self, raw: &str) {
        self.flush();
        self.push_line(self.level, raw.trim());
    }

    fn open(&mut self, raw: &str) {
        self.flush();
        self.line.push_str(raw);
        self.line_level = self.level;
        self.line_opens_block = true;
        self.opener_len = self.line.len();
        self.level += 1;
    }

    fn close(&mut self, raw: &str) {
        self.level = self.level.saturating_sub(1);
        if self.line_opens_block {
            self.line.truncate(self.line.trim_end().len());
            self.line.push_str(raw);
            self.flush();
        } else {
            self.block(raw);
        }
    }

    fn inline(&mut self, raw: &str) {
        if self.line.is_empty() {
            self.line_level = self.level;
        }
        self.line.push_str(raw);
    }

    fn text(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            let after_opener = self.line_opens_block && self.line.len() == self.opener_len;
            if !self.line.is_empty() && !after_opener && !self.line.ends_with(' ') {
                self.line.push(' ');
            }
            return;
        }
        let after_opener = self.line_opens_block && self.line.len() == self.opener_len;
        if self.line.is_empty() {
            self.line_level = self.level;
        } else if text.starts_with(char::is_whitespace)
            && !after_opener
            && !self.line.ends_with(' ')
        {
            self.line.push(' ');
        }
        self.line.push_str(&words.join(" "));
        if text.ends_with(char::is_whitespace) {
            self.line.push(' ');
        }
    }

    /// `<script>`/`<style>` at `start`. Returns the index after its end tag.
    fn raw_text(&mut self, tokens: &[Token<'_>], start: usize) -> usize {
        let open = tokens[start].raw;
        let (body, end) = match (tokens.get(start + 1), tokens.get(start + 2)) {
            (Some(Token { kind: TokenKind::Text(body), .. }), Some(end)) => (*body, Some(end)),
            (Some(end @ Token { kind: TokenKind::End(_), .. }), _) => ("", Some(end)),
            _ => ("", None),
        };
        let consumed = match (body.is_empty(), end.is_some()) {
            (true, true) => 2,
            (false, true) => 3,
            (false, false) => 2,
            (true, false) => 1,
        };
        let close = end.map_or("", |t| t.raw);

        self.flush();
        if body.trim().is_empty() {
            let line = format!("{open}{close}");
            self.push_line(self.level, &line);
            return start + consumed;
        }

        self.push_line(self.level, open);
        let lines: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();
        let common = lines
            .iter()
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);
        for line in lines {
            let text = line.get(common..).unwrap_or(line.trim_start()).trim_end();
            self.push_line(self.level + 1, text);
        }
        if !close.is_empty() {
            self.push_line(self.level, close);
        }
        start + consumed
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}

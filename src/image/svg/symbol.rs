//! `<svg>` to `<symbol>` conversion and the symbol sprite document.

use std::io::Cursor;

use anyhow::{Result, bail};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

const SPRITE_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#
);
const SPRITE_CLOSE: &str = "</svg>\n";

/// Rewrite the root `<svg>` of `svg` as `<symbol id="{id}">`, keeping its
/// `viewBox` and every child.
pub fn to_symbol(svg: &str, id: &str) -> Result<String> {
    let mut reader = Reader::from_str(svg);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(svg.len())));
    let mut depth = 0usize;
    let mut found = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if depth == 0 && e.name().as_ref() == b"svg" => {
                writer.write_event(Event::Start(symbol_start(&e, id)?))?;
                depth = 1;
                found = true;
            }
            Event::Empty(e) if depth == 0 && e.name().as_ref() == b"svg" => {
                writer.write_event(Event::Empty(symbol_start(&e, id)?))?;
                found = true;
            }
            Event::End(_) if depth == 1 => {
                writer.write_event(Event::End(BytesEnd::new("symbol")))?;
                depth = 0;
            }
            Event::Start(e) if depth > 0 => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) if depth > 0 => {
                depth -= 1;
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            event if depth > 0 => writer.write_event(event)?,
            _ => {}
        }
    }

    if !found {
        bail!("no <svg> root element");
    }
    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn symbol_start(svg: &BytesStart<'_>, id: &str) -> Result<BytesStart<'static>> {
    let mut symbol = BytesStart::new("symbol");
    symbol.push_attribute(("id", id));
    if let Some(view_box) = svg.try_get_attribute("viewBox")? {
        let value = String::from_utf8_lossy(&view_box.value).into_owned();
        symbol.push_attribute(("viewBox", value.as_str()));
    }
    Ok(symbol)
}

/// Symbols collected for one sprite document, in insertion order.
#[derive(Debug, Default)]
pub struct SymbolSprite {
    symbols: Vec<String>,
}

impl SymbolSprite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: String) {
        self.symbols.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn render(&self) -> String {
        let body: usize = self.symbols.iter().map(String::len).sum();
        let mut out = String::with_capacity(SPRITE_OPEN.len() + body + SPRITE_CLOSE.len());
        out.push_str(SPRITE_OPEN);
        for symbol in &self.symbols {
            out.push_str(symbol);
        }
        out.push_str(SPRITE_CLOSE);
        out
    }
}

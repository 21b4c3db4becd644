//! Merge per-module source maps into one inline bundle map.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sourcemap::{SourceMap, SourceMapBuilder};

use super::BundleError;

pub struct SourceMapMerger {
    builder: SourceMapBuilder,
}

impl SourceMapMerger {
    pub fn new(file: &str) -> Self {
        Self {
            builder: SourceMapBuilder::new(Some(file)),
        }
    }

    /// Add one module's map, shifting its generated lines by `line_offset`.
    ///
    /// Every token is attributed to `name`, with `original` as the embedded
    /// source text.
    pub fn add_module(
        &mut self,
        json: &str,
        name: &str,
        original: &str,
        line_offset: u32,
    ) -> Result<(), BundleError> {
        let map = SourceMap::from_slice(json.as_bytes())
            .map_err(|e| BundleError::SourceMap(format!("{name}: {e}")))?;

        let source_id = self.builder.add_source(name);
        self.builder.set_source_contents(source_id, Some(original));

        let names: Vec<u32> = map.names().map(|n| self.builder.add_name(n)).collect();
        for token in map.tokens() {
            if !token.has_source() {
                continue;
            }
            let name_id = names.get(token.get_name_id() as usize).copied();
            self.builder.add_raw(
                token.get_dst_line() + line_offset,
                token.get_dst_col(),
                token.get_src_line(),
                token.get_src_col(),
                Some(source_id),
                name_id,
                false,
            );
        }
        Ok(())
    }

    /// Serialize as a `sourceMappingURL` comment with a base64 data URL.
    pub fn into_comment(self) -> Result<String, BundleError> {
        let map = self.builder.into_sourcemap();
        let mut bytes = Vec::new();
        map.to_writer(&mut bytes)
            .map_err(|e| BundleError::SourceMap(e.to_string()))?;
        Ok(format!(
            "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}\n",
            STANDARD.encode(bytes)
        ))
    }
}

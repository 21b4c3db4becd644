//! YAML front matter at the top of a page.
//!
//! ```text
//! ---
//! title: About
//! layout: wide
//! ---
//! <h1>{{title}}</h1>
//! ```

use anyhow::{Result, bail};
use serde_json::{Map, Value};

const FENCE: &str = "---";

/// Split `src` into its front matter and body.
///
/// Pages without a leading fence have empty front matter.
pub fn split(src: &str) -> Result<(Map<String, Value>, &str)> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    let Some(rest) = src.strip_prefix(FENCE) else {
        return Ok((Map::new(), src));
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return Ok((Map::new(), src));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((parse(yaml)?, body));
        }
        offset += line.len();
    }
    bail!("front matter is not closed with `---`")
}

fn parse(yaml: &str) -> Result<Map<String, Value>> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => bail!("front matter must be a mapping, found `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_front_matter() {
        let (meta, body) = split("<p>hi</p>").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "<p>hi</p>");
    }

    #[test]
    fn test_front_matter() {
        let (meta, body) = split("---\ntitle: About\nlayout: wide\ntags: [a, b]\n---\n<h1>x</h1>\n").unwrap();
        assert_eq!(meta["title"], "About");
        assert_eq!(meta["layout"], "wide");
        assert_eq!(meta["tags"][1], "b");
        assert_eq!(body, "<h1>x</h1>\n");
    }

    #[test]
    fn test_empty_front_matter() {
        let (meta, body) = split("---\n---\nbody").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_crlf() {
        let (meta, body) = split("---\r\ntitle: x\r\n---\r\nbody").unwrap();
        assert_eq!(meta["title"], "x");
        assert_eq!(body, "body");
    }

    #[test]
    fn test_unclosed() {
        assert!(split("---\ntitle: x\n<p>").is_err());
    }

    #[test]
    fn test_not_a_mapping() {
        assert!(split("---\n- a\n- b\n---\n").is_err());
    }

    #[test]
    fn test_horizontal_rule_is_not_front_matter() {
        let (meta, body) = split("--- not yaml").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "--- not yaml");
    }
}

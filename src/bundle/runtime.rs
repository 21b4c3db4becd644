//! Module registry emitted around bundled code.

/// Opens the bundle IIFE and defines the registry helpers.
pub const HEADER: &str = r#"(function () {
'use strict';
var __modules = {};
var __cache = {};
function __define(id, factory) {
  __modules[id] = factory;
}
function __require(id) {
  var cached = __cache[id];
  if (cached) return cached;
  var exports = __cache[id] = {};
  __modules[id](exports, __require);
  return exports;
}
function __export(target, name, getter) {
  Object.defineProperty(target, name, { enumerable: true, get: getter });
}
function __exportStar(target, source) {
  Object.keys(source).forEach(function (name) {
    if (name !== 'default' && !Object.prototype.hasOwnProperty.call(target, name)) {
      __export(target, name, function () { return source[name]; });
    }
  });
}
"#;

/// Runs the entry module (always id 0) and closes the IIFE.
pub const FOOTER: &str = "__require(0);\n})();\n";

pub fn module_open(id: usize, display: &str) -> String {
    format!("// {display}\n__define({id}, function (__exports, __require) {{\n")
}

pub const MODULE_CLOSE: &str = "});\n";

pub fn line_count(text: &str) -> u32 {
    text.matches('\n').count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_line_count() {
        // path comment plus the `__define` line
        assert_eq!(line_count(&module_open(3, "js/a.js")), 2);
    }

    #[test]
    fn test_header_footer_balanced() {
        let text = format!("{HEADER}{FOOTER}");
        assert_eq!(text.matches('{').count(), text.matches('}').count());
        assert!(text.starts_with("(function () {"));
        assert!(text.ends_with("})();\n"));
    }
}

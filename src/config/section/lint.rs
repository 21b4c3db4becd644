//! `[lint.html]` and `[lint.style]` section configuration.
//!
//! HTML rule keys use the familiar htmlhint names.
//!
//! # Example
//!
//! ```toml
//! [lint.html]
//! fail = false                      # report only, never abort the HTML pipeline
//! inline-style-disabled = false
//! space-tab-mixed-disabled = "tab"
//! href-abs-or-rel = "off"
//!
//! [lint.style]
//! strict = true
//! max-nesting-depth = 3
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub html: HtmlLintConfig,
    pub style: StyleLintConfig,
}

/// Indentation policy for `space-tab-mixed-disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentPolicy {
    /// Rule disabled.
    Off,
    /// Only spaces allowed.
    Space,
    /// Only tabs allowed.
    Tab,
    /// Either, but not both on one line.
    Mixed,
}

/// Link policy for `href-abs-or-rel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrefPolicy {
    Off,
    /// Every `href` carries a scheme.
    Abs,
    /// No `href` points at an `http(s)://` URL.
    Rel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HtmlLintConfig {
    /// Abort the HTML pipeline when any rule reports.
    pub fail: bool,
    pub tagname_lowercase: bool,
    pub attr_lowercase: bool,
    pub attr_value_double_quotes: bool,
    pub attr_value_not_empty: bool,
    pub attr_no_duplication: bool,
    pub tag_pair: bool,
    pub tag_self_close: bool,
    pub id_unique: bool,
    pub src_not_empty: bool,
    pub title_require: bool,
    pub alt_require: bool,
    pub doctype_html5: bool,
    pub style_disabled: bool,
    pub inline_style_disabled: bool,
    pub inline_script_disabled: bool,
    pub space_tab_mixed_disabled: IndentPolicy,
    pub id_class_ad_disabled: bool,
    pub href_abs_or_rel: HrefPolicy,
    pub attr_unsafe_chars: bool,
    pub spec_char_escape: bool,
    pub attr_no_unnecessary_whitespace: bool,
}

impl Default for HtmlLintConfig {
    fn default() -> Self {
        Self {
            fail: true,
            tagname_lowercase: true,
            attr_lowercase: true,
            attr_value_double_quotes: true,
            attr_value_not_empty: false,
            attr_no_duplication: true,
            tag_pair: true,
            tag_self_close: true,
            id_unique: true,
            src_not_empty: true,
            title_require: true,
            alt_require: true,
            doctype_html5: true,
            style_disabled: true,
            inline_style_disabled: true,
            inline_script_disabled: false,
            space_tab_mixed_disabled: IndentPolicy::Space,
            id_class_ad_disabled: true,
            href_abs_or_rel: HrefPolicy::Rel,
            attr_unsafe_chars: true,
            spec_char_escape: true,
            attr_no_unnecessary_whitespace: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleLintConfig {
    /// Abort the styles pipeline when an error-severity rule reports.
    pub strict: bool,
    pub no_important: bool,
    pub no_empty_rulesets: bool,
    pub no_trailing_whitespace: bool,
    pub no_mixed_indentation: bool,
    /// Deepest allowed selector nesting; `0` disables the rule.
    pub max_nesting_depth: usize,
}

impl Default for StyleLintConfig {
    fn default() -> Self {
        Self {
            strict: true,
            no_important: true,
            no_empty_rulesets: true,
            no_trailing_whitespace: true,
            no_mixed_indentation: true,
            max_nesting_depth: 4,
        }
    }
}

impl LintConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.style.max_nesting_depth > 32 {
            diag.error_with_hint(
                FieldPath::new("lint.style.max-nesting-depth"),
                format!("{} is not a useful nesting limit", self.style.max_nesting_depth),
                "use 0 to disable the rule",
            );
        }
    }
}

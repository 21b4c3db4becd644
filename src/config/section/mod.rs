//! Configuration section definitions.
//!
//! Each module corresponds to a section in `frontkit.toml`:
//!
//! | Module   | TOML Section                 | Purpose                          |
//! |----------|------------------------------|----------------------------------|
//! | `source` | `[source]`, `[watch]`        | Pipeline inputs, watch globs     |
//! | `target` | `[target.dev/dist/build]`    | Output layout per build mode     |
//! | `sprite` | `[sprite]`                   | Raster icon sprite               |
//! | `lint`   | `[lint.html]`, `[lint.style]`| Built-in lint rule toggles       |
//! | `output` | `[beautify]`, `[images]`     | HTML formatting, JPEG quality    |
//! | `serve`  | `[serve]`                    | Preview server                   |

mod lint;
mod output;
mod serve;
mod source;
mod sprite;
mod target;

pub use lint::{HrefPolicy, HtmlLintConfig, IndentPolicy, LintConfig, StyleLintConfig};
pub use output::{BeautifyConfig, ImagesConfig};
pub use serve::ServeConfig;
pub use source::{SourceConfig, WatchConfig};
pub use sprite::SpriteConfig;
pub use target::{TargetDirs, TargetsConfig};

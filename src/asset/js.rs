//! Script transformation with oxc: ES2015 lowering, minification.

use std::path::Path;

use anyhow::{Result, anyhow, bail};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{HelperLoaderMode, TransformOptions, Transformer};

/// Output syntax level for bundled scripts.
pub const TARGET: &str = "es2015";

/// Lowered code plus its source map JSON, when requested.
#[derive(Debug)]
pub struct Transpiled {
    pub code: String,
    pub map: Option<String>,
}

/// Lower `source` to [`TARGET`] syntax.
///
/// Helpers are referenced through a global `babelHelpers` object that the
/// caller must provide. `name` is used for error messages and as the
/// source map's source.
pub fn transpile(source: &str, name: &str, sourcemap: bool) -> Result<Transpiled> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        bail!("{name}: {err}");
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let mut options = TransformOptions::from_target(TARGET).map_err(|e| anyhow!(e))?;
    options.helper_loader.mode = HelperLoaderMode::External;
    let ret = Transformer::new(&allocator, Path::new(name), &options)
        .build_with_scoping(scoping, &mut program);
    if let Some(err) = ret.errors.first() {
        bail!("{name}: {err}");
    }

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: sourcemap.then(|| Path::new(name).to_path_buf()),
            ..CodegenOptions::default()
        })
        .build(&program);

    Ok(Transpiled {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    })
}

/// Minify JavaScript source code.
pub fn minify(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        bail!("minify: {err}");
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

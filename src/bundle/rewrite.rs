//! ES module syntax to registry calls.
//!
//! Each `import`/`export` statement is replaced in place, keeping the
//! statement's line count so positions in the rewritten body still point at
//! the right lines of the original file. Export getters and module requires
//! are hoisted onto the first line.
//!
//! ```text
//! import a, { b as c } from './x'   var __m1 = __require(1);  a -> __m1.default, c -> __m1.b
//! export * from './y'               __exportStar(__exports, __require(2));
//! export const n = 1                const n = 1          + getter "n"
//! export default expr               var __default = expr; + getter "default"
//! ```
//!
//! Imported names are rewritten to member reads on the required module at
//! every use site, so they stay live and see later `export let` updates.

use oxc::allocator::Allocator;
use oxc::ast::AstKind;
use oxc::ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, ModuleExportName,
    Statement,
};
use oxc::parser::Parser;
use oxc::semantic::{Scoping, Semantic, SemanticBuilder, SymbolId};
use oxc::span::{GetSpan, SourceType, Span};
use rustc_hash::FxHashMap;

use super::BundleError;

const DEFAULT_LOCAL: &str = "__default";

struct Edit {
    span: Span,
    text: String,
}

/// An imported binding and the expression that reads it.
struct ImportBinding {
    symbol: SymbolId,
    access: String,
}

/// Rewrite one module's source.
///
/// `require` maps an import specifier to the id of the module it names,
/// registering that module with the graph on first sight.
pub fn rewrite<F>(source: &str, display: &str, mut require: F) -> Result<String, BundleError>
where
    F: FnMut(&str) -> Result<usize, BundleError>,
{
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(BundleError::Parse {
            path: display.to_string(),
            message: err.to_string(),
        });
    }
    let program = ret.program;
    let semantic = SemanticBuilder::new().build(&program).semantic;

    let mut edits = Vec::new();
    let mut getters: Vec<(String, String)> = Vec::new();
    let mut requires: Vec<String> = Vec::new();
    let mut imports: Vec<ImportBinding> = Vec::new();

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let id = require(decl.source.value.as_str())?;
                let module = format!("__m{id}");
                let specifiers = decl.specifiers.as_ref().filter(|s| !s.is_empty());
                match specifiers {
                    Some(specifiers) => {
                        requires.push(format!("var {module} = __require({id});"));
                        imports.extend(specifiers.iter().map(|spec| import_binding(&module, spec)));
                    }
                    None => requires.push(format!("__require({id});")),
                }
                edits.push(Edit {
                    span: decl.span,
                    text: String::new(),
                });
            }
            Statement::ExportAllDeclaration(decl) => {
                let id = require(decl.source.value.as_str())?;
                let text = match &decl.exported {
                    Some(name) => export_getter(&name.name(), &format!("__require({id})")),
                    None => format!("__exportStar(__exports, __require({id}));"),
                };
                edits.push(Edit {
                    span: decl.span,
                    text,
                });
            }
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(source) = &decl.source {
                    let id = require(source.value.as_str())?;
                    let module = format!("__m{id}");
                    let mut text = format!("var {module} = __require({id});");
                    for spec in &decl.specifiers {
                        let value = member(&module, &spec.local.name());
                        text.push(' ');
                        text.push_str(&export_getter(&spec.exported.name(), &value));
                    }
                    edits.push(Edit {
                        span: decl.span,
                        text,
                    });
                } else if let Some(declaration) = &decl.declaration {
                    for name in declared_names(declaration) {
                        getters.push((name.clone(), name));
                    }
                    edits.push(Edit {
                        span: Span::new(decl.span.start, declaration.span().start),
                        text: String::new(),
                    });
                } else {
                    for spec in &decl.specifiers {
                        getters.push((
                            spec.exported.name().to_string(),
                            local_name(&spec.local),
                        ));
                    }
                    edits.push(Edit {
                        span: decl.span,
                        text: String::new(),
                    });
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                let kind_span = decl.declaration.span();
                let prefix = Span::new(decl.span.start, kind_span.start);
                if let Some(name) = default_name(&decl.declaration) {
                    getters.push(("default".to_string(), name));
                    edits.push(Edit {
                        span: prefix,
                        text: String::new(),
                    });
                } else {
                    getters.push(("default".to_string(), DEFAULT_LOCAL.to_string()));
                    edits.push(Edit {
                        span: prefix,
                        text: format!("var {DEFAULT_LOCAL} = "),
                    });
                }
            }
            _ => {}
        }
    }

    edits.extend(reference_edits(&semantic, &imports));
    edits.sort_by_key(|edit| edit.span.start);

    // `export { name }` of an imported name forwards the member read
    let imported_by_name: FxHashMap<&str, &str> = imports
        .iter()
        .map(|binding| {
            (
                semantic.scoping().symbol_name(binding.symbol),
                binding.access.as_str(),
            )
        })
        .collect();
    let mut prelude: String = getters
        .iter()
        .map(|(name, local)| {
            let value = imported_by_name
                .get(local.as_str())
                .copied()
                .unwrap_or(local.as_str());
            export_getter(name, value) + " "
        })
        .collect();
    for line in &requires {
        prelude.push_str(line);
        prelude.push(' ');
    }
    Ok(apply(source, &prelude, &edits))
}

fn import_binding(module: &str, spec: &ImportDeclarationSpecifier<'_>) -> ImportBinding {
    match spec {
        ImportDeclarationSpecifier::ImportSpecifier(s) => ImportBinding {
            symbol: s.local.symbol_id(),
            access: member(module, &s.imported.name()),
        },
        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportBinding {
            symbol: s.local.symbol_id(),
            access: format!("{module}.default"),
        },
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportBinding {
            symbol: s.local.symbol_id(),
            access: module.to_string(),
        },
    }
}

/// Replace every read of an imported binding with its member access.
///
/// Shorthand properties are expanded, and calls keep an `undefined` receiver
/// the way a direct call of an imported function would.
fn reference_edits(semantic: &Semantic<'_>, imports: &[ImportBinding]) -> Vec<Edit> {
    let scoping: &Scoping = semantic.scoping();
    let nodes = semantic.nodes();
    let mut edits = Vec::new();

    for binding in imports {
        for reference in scoping.get_resolved_references(binding.symbol) {
            let node_id = reference.node_id();
            let AstKind::IdentifierReference(ident) = nodes.kind(node_id) else {
                continue;
            };
            let edit = match nodes.parent_kind(node_id) {
                AstKind::ExportSpecifier(_) => continue,
                AstKind::ObjectProperty(prop) if prop.shorthand => Edit {
                    span: prop.span,
                    text: format!("{}: {}", ident.name, binding.access),
                },
                AstKind::CallExpression(call) if call.callee.span() == ident.span => Edit {
                    span: ident.span,
                    text: format!("(0, {})", binding.access),
                },
                AstKind::TaggedTemplateExpression(tagged) if tagged.tag.span() == ident.span => {
                    Edit {
                        span: ident.span,
                        text: format!("(0, {})", binding.access),
                    }
                }
                _ => Edit {
                    span: ident.span,
                    text: binding.access.clone(),
                },
            };
            edits.push(edit);
        }
    }
    edits
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|ident| ident.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.to_string()).collect()
        }
        _ => Vec::new(),
    }
}

fn default_name(kind: &ExportDefaultDeclarationKind<'_>) -> Option<String> {
    match kind {
        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
            func.id.as_ref().map(|id| id.name.to_string())
        }
        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
            class.id.as_ref().map(|id| id.name.to_string())
        }
        _ => None,
    }
}

fn local_name(name: &ModuleExportName<'_>) -> String {
    name.name().to_string()
}

fn export_getter(name: &str, value: &str) -> String {
    format!(
        "__export(__exports, {}, function () {{ return {value}; }});",
        quote(name)
    )
}

fn member(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", quote(name))
    }
}

fn quote(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Splice edits into `source`, padding each with the newlines it removed.
fn apply(source: &str, prelude: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(source.len() + prelude.len() + 64);
    out.push_str(prelude);
    let mut cursor = 0;
    for edit in edits {
        let (start, end) = (edit.span.start as usize, edit.span.end as usize);
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.text);
        let removed = source[start..end].matches('\n').count();
        let added = edit.text.matches('\n').count();
        out.extend(std::iter::repeat_n('\n', removed.saturating_sub(added)));
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

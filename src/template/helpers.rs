//! Built-in block helpers.
//!
//! ```handlebars
//! {{#ifpage 'index' 'about'}}...{{else}}...{{/ifpage}}
//! {{#unlesspage 'index'}}...{{/unlesspage}}
//! {{#ifequal section 'blog'}}...{{/ifequal}}
//! {{#repeat 3}}<li>{{@index}}</li>{{/repeat}}
//! ```

use handlebars::{
    BlockContext, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError, Renderable,
};
use serde_json::Value;

pub fn register(registry: &mut Handlebars<'static>) {
    registry.register_helper("ifpage", Box::new(PageCondition { negate: false }));
    registry.register_helper("unlesspage", Box::new(PageCondition { negate: true }));
    registry.register_helper("ifequal", Box::new(IfEqual));
    registry.register_helper("repeat", Box::new(Repeat));
}

/// Render the main block when `cond` holds, the `{{else}}` block otherwise.
fn branch<'reg: 'rc, 'rc>(
    cond: bool,
    h: &Helper<'reg, 'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let template = if cond { h.template() } else { h.inverse() };
    match template {
        Some(t) => t.render(r, ctx, rc, out),
        None => Ok(()),
    }
}

/// Current page name, as set by the renderer.
fn current_page(ctx: &Context) -> Option<&str> {
    ctx.data().get("page").and_then(Value::as_str)
}

struct PageCondition {
    negate: bool,
}

impl HelperDef for PageCondition {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let page = current_page(ctx);
        let listed = h
            .params()
            .iter()
            .any(|p| p.value().as_str().is_some() && p.value().as_str() == page);
        branch(listed != self.negate, h, r, ctx, rc, out)
    }
}

struct IfEqual;

impl HelperDef for IfEqual {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (Some(a), Some(b)) = (h.param(0), h.param(1)) else {
            return Err(RenderError::new("ifequal needs two arguments"));
        };
        branch(a.value() == b.value(), h, r, ctx, rc, out)
    }
}

struct Repeat;

impl HelperDef for Repeat {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let count = h
            .param(0)
            .and_then(|p| p.value().as_u64())
            .ok_or_else(|| RenderError::new("repeat needs a non-negative count"))?;
        let Some(template) = h.template() else {
            return Ok(());
        };

        for index in 0..count {
            let mut block = BlockContext::new();
            block.set_local_var("index", Value::from(index));
            block.set_local_var("first", Value::from(index == 0));
            block.set_local_var("last", Value::from(index + 1 == count));
            rc.push_block(block);
            let result = template.render(r, ctx, rc, out);
            rc.pop_block();
            result?;
        }
        Ok(())
    }
}
